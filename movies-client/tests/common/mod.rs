#![allow(dead_code)]

use movies_client::AppState;
use movies_client::config::{
    CatalogCredentials, DiscoveryPolicy, IdentityProviderSettings, MovieApiSettings,
    ServerSettings, Settings,
};
use movies_client::services::{CatalogClient, ChannelAuthorizer};
use reqwest::Client;
use serde_json::{Value, json};
use service_core::config::TelemetryConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";
pub const USERINFO_PATH: &str = "/connect/userinfo";
pub const TOKEN_PATH: &str = "/connect/token";
pub const USER_TOKEN: &str = "user-access-token";

/// Discovery document whose endpoints all live on `authority`.
pub fn discovery_document(authority: &str) -> Value {
    json!({
        "issuer": authority,
        "authorization_endpoint": format!("{}/connect/authorize", authority),
        "token_endpoint": format!("{}{}", authority, TOKEN_PATH),
        "userinfo_endpoint": format!("{}{}", authority, USERINFO_PATH),
        "jwks_uri": format!("{}/.well-known/openid-configuration/jwks", authority),
        "scopes_supported": ["openid", "profile", "movieAPI"]
    })
}

/// Serve a valid discovery document, expecting exactly `calls` requests.
pub async fn mount_discovery(server: &MockServer, calls: u64) {
    Mock::given(method("GET"))
        .and(path(DISCOVERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&server.uri())))
        .expect(calls)
        .mount(server)
        .await;
}

pub fn sample_movies() -> Value {
    json!([
        {
            "id": 1,
            "title": "The Shawshank Redemption",
            "genre": "Drama",
            "rating": "9.3",
            "imageUrl": "images/shawshank.jpg",
            "releaseDate": "1994-05-05T00:00:00",
            "owner": "alice"
        },
        {
            "id": 2,
            "title": "The Godfather",
            "genre": "Crime",
            "rating": "9.2",
            "imageUrl": "images/godfather.jpg",
            "releaseDate": "1972-05-05T00:00:00",
            "owner": "bob"
        },
        {
            "id": 3,
            "title": "The Dark Knight",
            "genre": "Action",
            "rating": "9.1",
            "imageUrl": "images/darkknight.jpg",
            "releaseDate": "2008-05-05T00:00:00",
            "owner": "alice"
        }
    ])
}

pub fn identity_provider_settings(authority: &str) -> IdentityProviderSettings {
    IdentityProviderSettings {
        authority: authority.to_string(),
        timeout_seconds: 5,
        connect_timeout_seconds: 5,
        discovery: DiscoveryPolicy::default(),
    }
}

pub fn movie_api_settings(base_url: &str, credentials: CatalogCredentials) -> MovieApiSettings {
    MovieApiSettings {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        connect_timeout_seconds: 5,
        credentials,
    }
}

pub fn settings(
    identity_provider: IdentityProviderSettings,
    movie_api: MovieApiSettings,
) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        telemetry: TelemetryConfig {
            service_name: "movies-client-test".to_string(),
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        identity_provider,
        movie_api,
    }
}

/// Application state wired to the given mock identity provider and catalog.
pub fn app_state(idp: &MockServer, catalog: &MockServer) -> AppState {
    app_state_with(
        identity_provider_settings(&idp.uri()),
        movie_api_settings(&catalog.uri(), CatalogCredentials::PreAuthorized),
    )
}

pub fn app_state_with(
    identity_provider: IdentityProviderSettings,
    movie_api: MovieApiSettings,
) -> AppState {
    AppState::from_settings(&settings(identity_provider, movie_api))
        .expect("Failed to build application state")
}

/// Catalog client on a pre-authorized channel, without any identity provider.
pub fn catalog_client(settings: &MovieApiSettings) -> CatalogClient {
    let authorizer = ChannelAuthorizer::new(
        CatalogCredentials::PreAuthorized,
        Client::new(),
        None,
        settings.timeout(),
    );
    CatalogClient::new(Client::new(), settings, authorizer)
}
