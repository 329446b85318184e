use crate::error::ClientError;
use crate::models::ClaimSet;
use crate::models::claims::claims_from_json;
use crate::services::discovery::DiscoveryResolver;
use crate::services::metrics::record_upstream;
use crate::services::token::AccessTokenProvider;
use crate::services::upstream::error_detail;
use reqwest::Client;
use secrecy::ExposeSecret;
use service_core::observability::TracedClientExt;
use std::sync::Arc;
use std::time::Duration;

/// Exchanges the caller's access token for their identity claims.
pub struct IdentityClient {
    client: Client,
    discovery: Arc<DiscoveryResolver>,
    timeout: Duration,
}

impl IdentityClient {
    pub fn new(client: Client, discovery: Arc<DiscoveryResolver>, timeout: Duration) -> Self {
        Self {
            client,
            discovery,
            timeout,
        }
    }

    pub fn discovery(&self) -> &Arc<DiscoveryResolver> {
        &self.discovery
    }

    /// Fetch the current caller's claims from the user-info endpoint.
    ///
    /// Discovery must succeed first; on a discovery error the user-info
    /// endpoint is never contacted. Claims are always fetched live.
    pub async fn get_user_info(
        &self,
        tokens: &dyn AccessTokenProvider,
    ) -> Result<ClaimSet, ClientError> {
        let metadata = self.discovery.resolve().await?;
        let endpoint = metadata.userinfo_endpoint.as_str();

        let mut request = self.client.traced_get(endpoint).timeout(self.timeout);
        match tokens.access_token().await {
            Some(token) => request = request.bearer_auth(token.expose_secret()),
            // Sent anyway so the provider's rejection reaches the caller
            None => tracing::warn!("No access token for the current caller"),
        }

        tracing::debug!(endpoint = %endpoint, "Requesting user info");

        let response = request.send().await.map_err(|e| {
            record_upstream("identity_provider", "transport_error");
            ClientError::from_transport(e, "user info", |detail| ClientError::UserInfo {
                status: None,
                detail,
            })
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            record_upstream("identity_provider", "transport_error");
            ClientError::from_transport(e, "user info", |detail| ClientError::UserInfo {
                status: Some(status),
                detail,
            })
        })?;

        if !status.is_success() {
            record_upstream("identity_provider", "rejected");
            let detail = error_detail(status, &headers, &body);
            tracing::warn!(status = %status, detail = %detail, "User info request rejected");
            return Err(ClientError::UserInfo {
                status: Some(status),
                detail,
            });
        }

        let claims = serde_json::from_str(&body)
            .map_err(|e| format!("malformed user info response: {}", e))
            .and_then(claims_from_json)
            .map_err(|detail| {
                record_upstream("identity_provider", "invalid_response");
                ClientError::UserInfo {
                    status: Some(status),
                    detail,
                }
            })?;

        record_upstream("identity_provider", "success");
        let claim_set = ClaimSet::from_claims(claims);
        tracing::info!(claims = claim_set.len(), "User info retrieved");

        Ok(claim_set)
    }
}
