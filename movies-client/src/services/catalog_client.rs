//! Movie catalog API client.
//!
//! Listing is a two-phase read: the status line and headers are inspected
//! before any of the body is consumed, so a rejected request never pays for
//! downloading or parsing its payload.

use crate::config::MovieApiSettings;
use crate::error::ClientError;
use crate::models::Movie;
use crate::services::channel_credentials::ChannelAuthorizer;
use crate::services::metrics::record_upstream;
use reqwest::Client;
use service_core::observability::TracedClientExt;
use std::time::Duration;

pub const MOVIES_PATH: &str = "/Movies";

pub struct CatalogClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    authorizer: ChannelAuthorizer,
}

impl CatalogClient {
    /// `client` is the catalog channel; it is shared by every call.
    pub fn new(client: Client, settings: &MovieApiSettings, authorizer: ChannelAuthorizer) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: settings.timeout(),
            authorizer,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every movie, in the order the catalog returns them.
    pub async fn list_movies(&self) -> Result<Vec<Movie>, ClientError> {
        let url = format!("{}{}", self.base_url, MOVIES_PATH);
        let request = self
            .authorizer
            .authorize(self.client.traced_get(&url).timeout(self.timeout))
            .await?;

        tracing::debug!(url = %url, "Requesting movie list");

        // Phase one: status and headers only
        let response = request.send().await.map_err(|e| {
            record_upstream("catalog", "transport_error");
            ClientError::from_transport(e, "catalog listing", |detail| {
                ClientError::CatalogRequest {
                    status: None,
                    detail,
                }
            })
        })?;

        let status = response.status();
        if !status.is_success() {
            record_upstream("catalog", "rejected");
            tracing::error!(url = %url, status = %status, "Catalog request rejected");
            return Err(ClientError::CatalogRequest {
                status: Some(status),
                detail: format!("{} returned {}", url, status),
            });
        }

        // Phase two: the full body
        let body = response.bytes().await.map_err(|e| {
            record_upstream("catalog", "transport_error");
            ClientError::from_transport(e, "catalog listing", |detail| {
                ClientError::CatalogRequest {
                    status: Some(status),
                    detail,
                }
            })
        })?;

        let movies: Vec<Movie> = serde_json::from_slice(&body).map_err(|e| {
            record_upstream("catalog", "invalid_response");
            tracing::error!(url = %url, error = %e, "Catalog returned an unreadable movie list");
            ClientError::CatalogDecode(e)
        })?;

        record_upstream("catalog", "success");
        tracing::info!(count = movies.len(), "Movie list retrieved");

        Ok(movies)
    }

    pub async fn get_movie(&self, _id: i32) -> Result<Movie, ClientError> {
        Err(ClientError::NotImplemented {
            operation: "get_movie",
        })
    }

    pub async fn create_movie(&self, _movie: Movie) -> Result<Movie, ClientError> {
        Err(ClientError::NotImplemented {
            operation: "create_movie",
        })
    }

    pub async fn update_movie(&self, _movie: Movie) -> Result<Movie, ClientError> {
        Err(ClientError::NotImplemented {
            operation: "update_movie",
        })
    }

    pub async fn delete_movie(&self, _id: i32) -> Result<(), ClientError> {
        Err(ClientError::NotImplemented {
            operation: "delete_movie",
        })
    }
}
