//! Identity provider discovery.
//!
//! Fetches `{authority}/.well-known/openid-configuration`, validates it
//! against the configured [`DiscoveryPolicy`] and optionally keeps it for a
//! fixed time.

use crate::config::{DiscoveryPolicy, IdentityProviderSettings};
use crate::error::ClientError;
use crate::models::ProviderMetadata;
use crate::models::discovery::is_secure;
use crate::services::metrics::record_upstream;
use crate::services::upstream::error_detail;
use reqwest::{Client, Url};
use service_core::observability::TracedClientExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

struct CachedMetadata {
    fetched_at: Instant,
    metadata: Arc<ProviderMetadata>,
}

pub struct DiscoveryResolver {
    client: Client,
    authority: Url,
    /// The authority exactly as configured; the issuer must match it.
    authority_name: String,
    policy: DiscoveryPolicy,
    timeout: Duration,
    cache: RwLock<Option<CachedMetadata>>,
}

impl DiscoveryResolver {
    /// Create a resolver on the identity provider channel `client`.
    ///
    /// Fails when the authority is not a valid URL or violates the https
    /// requirement.
    pub fn new(client: Client, settings: &IdentityProviderSettings) -> Result<Self, ClientError> {
        let authority = Url::parse(&settings.authority).map_err(|e| {
            ClientError::Discovery(format!("invalid authority '{}': {}", settings.authority, e))
        })?;

        if settings.discovery.require_https && !is_secure(&authority) {
            return Err(ClientError::Discovery(format!(
                "authority '{}' does not use https",
                authority
            )));
        }

        Ok(Self {
            client,
            authority,
            authority_name: settings.authority.clone(),
            policy: settings.discovery.clone(),
            timeout: settings.timeout(),
            cache: RwLock::new(None),
        })
    }

    pub fn authority(&self) -> &Url {
        &self.authority
    }

    pub fn discovery_url(&self) -> String {
        format!(
            "{}{}",
            self.authority.as_str().trim_end_matches('/'),
            DISCOVERY_PATH
        )
    }

    /// Resolve the provider metadata.
    ///
    /// Served from cache while a cached document is younger than
    /// `cache_ttl_seconds`; otherwise fetched. Errors are never cached.
    pub async fn resolve(&self) -> Result<Arc<ProviderMetadata>, ClientError> {
        let ttl = Duration::from_secs(self.policy.cache_ttl_seconds);

        if !ttl.is_zero() {
            let cached = self.cache.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.fetched_at.elapsed() < ttl {
                    tracing::debug!(authority = %self.authority, "Discovery document served from cache");
                    return Ok(entry.metadata.clone());
                }
            }
        }

        let metadata = Arc::new(self.fetch().await?);

        if !ttl.is_zero() {
            *self.cache.write().await = Some(CachedMetadata {
                fetched_at: Instant::now(),
                metadata: metadata.clone(),
            });
        }

        Ok(metadata)
    }

    /// Drop any cached document so the next [`resolve`](Self::resolve) fetches.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn fetch(&self) -> Result<ProviderMetadata, ClientError> {
        let url = self.discovery_url();
        tracing::debug!(url = %url, "Fetching discovery document");

        let response = self
            .client
            .traced_get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                record_upstream("identity_provider", "transport_error");
                ClientError::from_transport(e, "discovery", |detail| {
                    ClientError::Discovery(format!("error connecting to {}: {}", url, detail))
                })
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            record_upstream("identity_provider", "transport_error");
            ClientError::from_transport(e, "discovery", ClientError::Discovery)
        })?;

        if !status.is_success() {
            record_upstream("identity_provider", "rejected");
            let detail = error_detail(status, &headers, &body);
            tracing::error!(url = %url, status = %status, detail = %detail, "Discovery request rejected");
            return Err(ClientError::Discovery(format!(
                "error connecting to {}: {}",
                url, detail
            )));
        }

        let metadata: ProviderMetadata = serde_json::from_str(&body).map_err(|e| {
            record_upstream("identity_provider", "invalid_response");
            ClientError::Discovery(format!("malformed discovery document: {}", e))
        })?;

        metadata
            .validate(&self.authority_name, &self.policy)
            .map_err(|reason| {
                record_upstream("identity_provider", "invalid_response");
                tracing::error!(authority = %self.authority, reason = %reason, "Discovery policy violation");
                ClientError::Discovery(reason)
            })?;

        record_upstream("identity_provider", "success");
        tracing::info!(
            issuer = %metadata.issuer,
            userinfo_endpoint = %metadata.userinfo_endpoint,
            "Discovery document resolved"
        );

        Ok(metadata)
    }
}
