pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use anyhow::Context;
use config::Settings;
use reqwest::Client;
use services::{
    AccessTokenProvider, CatalogClient, ChannelAuthorizer, DiscoveryResolver, IdentityClient,
    MovieService,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state: one client per upstream destination.
#[derive(Clone)]
pub struct AppState {
    pub identity_client: Arc<IdentityClient>,
    pub catalog_client: Arc<CatalogClient>,
}

impl AppState {
    pub fn new(identity_client: Arc<IdentityClient>, catalog_client: Arc<CatalogClient>) -> Self {
        Self {
            identity_client,
            catalog_client,
        }
    }

    /// Build both channels and the clients on top of them.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let idp = &settings.identity_provider;
        let identity_http = build_http_client(idp.connect_timeout())
            .context("Failed to build identity provider HTTP client")?;
        let catalog_http = build_http_client(settings.movie_api.connect_timeout())
            .context("Failed to build catalog HTTP client")?;

        let discovery = Arc::new(
            DiscoveryResolver::new(identity_http.clone(), idp)
                .context("Invalid identity provider configuration")?,
        );
        let identity_client = Arc::new(IdentityClient::new(
            identity_http.clone(),
            discovery.clone(),
            idp.timeout(),
        ));

        tracing::info!(
            strategy = ?settings.movie_api.credentials,
            base_url = %settings.movie_api.base_url,
            "Catalog channel configured"
        );
        let authorizer = ChannelAuthorizer::new(
            settings.movie_api.credentials.clone(),
            identity_http,
            Some(discovery),
            idp.timeout(),
        );
        let catalog_client = Arc::new(CatalogClient::new(
            catalog_http,
            &settings.movie_api,
            authorizer,
        ));

        Ok(Self::new(identity_client, catalog_client))
    }

    /// The movie service acting for the caller identified by `tokens`.
    pub fn movie_service<T: AccessTokenProvider>(&self, tokens: T) -> MovieService<T> {
        MovieService::new(
            self.identity_client.clone(),
            self.catalog_client.clone(),
            tokens,
        )
    }
}

fn build_http_client(connect_timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(concat!("movies-client/", env!("CARGO_PKG_VERSION")))
        .build()
}
