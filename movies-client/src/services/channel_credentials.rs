//! Credential acquisition for the catalog channel.
//!
//! Which strategy is active is a deployment decision taken in
//! configuration (`movie_api.credentials.strategy`); the catalog client only
//! asks the authorizer to prepare each request.

use crate::config::CatalogCredentials;
use crate::error::ClientError;
use crate::services::discovery::DiscoveryResolver;
use crate::services::metrics::record_upstream;
use crate::services::upstream::error_detail;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tokens are refreshed this long before the provider says they expire.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: Secret<String>,
    expires_at: Instant,
}

pub struct ChannelAuthorizer {
    credentials: CatalogCredentials,
    client: Client,
    discovery: Option<Arc<DiscoveryResolver>>,
    timeout: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl ChannelAuthorizer {
    /// `client` and `discovery` are only used by the client-credentials
    /// strategy: `client` talks to the token endpoint, `discovery` supplies
    /// it when no explicit endpoint is configured.
    pub fn new(
        credentials: CatalogCredentials,
        client: Client,
        discovery: Option<Arc<DiscoveryResolver>>,
        timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            client,
            discovery,
            timeout,
            cached: Mutex::new(None),
        }
    }

    /// Attach the channel credential to `request`.
    pub async fn authorize(&self, request: TracedRequest) -> Result<TracedRequest, ClientError> {
        match &self.credentials {
            CatalogCredentials::PreAuthorized => Ok(request),
            CatalogCredentials::StaticBearer { token } => {
                Ok(request.bearer_auth(token.expose_secret()))
            }
            CatalogCredentials::ClientCredentials { .. } => {
                let token = self.client_credentials_token().await?;
                Ok(request.bearer_auth(token.expose_secret()))
            }
        }
    }

    async fn client_credentials_token(&self) -> Result<Secret<String>, ClientError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if Instant::now() < entry.expires_at {
                return Ok(entry.token.clone());
            }
        }

        let response = self.request_token().await?;
        let token = Secret::new(response.access_token);

        *cached = response.expires_in.and_then(|expires_in| {
            let lifetime = Duration::from_secs(expires_in).checked_sub(EXPIRY_SKEW)?;
            Some(CachedToken {
                token: token.clone(),
                expires_at: Instant::now() + lifetime,
            })
        });

        Ok(token)
    }

    async fn request_token(&self) -> Result<TokenResponse, ClientError> {
        let CatalogCredentials::ClientCredentials {
            client_id,
            client_secret,
            scope,
            token_endpoint,
        } = &self.credentials
        else {
            return Err(ClientError::ChannelCredentials(
                "client credentials strategy is not configured".to_string(),
            ));
        };

        let endpoint = match (token_endpoint, &self.discovery) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(discovery)) => discovery
                .resolve()
                .await
                .map_err(|e| match e {
                    ClientError::TransportTimeout { .. } => e,
                    other => ClientError::ChannelCredentials(other.to_string()),
                })?
                .token_endpoint
                .clone(),
            (None, None) => {
                return Err(ClientError::ChannelCredentials(
                    "no token endpoint configured and no identity provider to discover it"
                        .to_string(),
                ));
            }
        };

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.expose_secret().as_str()),
        ];
        if let Some(scope) = scope {
            form.push(("scope", scope.as_str()));
        }

        tracing::debug!(endpoint = %endpoint, client_id = %client_id, "Requesting client credentials token");

        let response = self
            .client
            .traced_post(&endpoint)
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                record_upstream("token_endpoint", "transport_error");
                ClientError::from_transport(
                    e,
                    "client credentials token",
                    ClientError::ChannelCredentials,
                )
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            record_upstream("token_endpoint", "transport_error");
            ClientError::from_transport(e, "client credentials token", ClientError::ChannelCredentials)
        })?;

        if !status.is_success() {
            record_upstream("token_endpoint", "rejected");
            let detail = error_detail(status, &headers, &body);
            tracing::error!(status = %status, detail = %detail, "Client credentials token request rejected");
            return Err(ClientError::ChannelCredentials(detail));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            record_upstream("token_endpoint", "invalid_response");
            ClientError::ChannelCredentials(format!("malformed token response: {}", e))
        })?;

        record_upstream("token_endpoint", "success");
        tracing::info!(expires_in = ?token.expires_in, "Client credentials token acquired");

        Ok(token)
    }
}
