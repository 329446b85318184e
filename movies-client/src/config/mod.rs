use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{TelemetryConfig, load_layered};
use service_core::error::AppError;
use std::time::Duration;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub telemetry: TelemetryConfig,
    pub identity_provider: IdentityProviderSettings,
    pub movie_api: MovieApiSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct IdentityProviderSettings {
    /// Base address of the OpenID Connect provider (e.g. https://localhost:5005).
    pub authority: String,
    /// Per-request timeout for discovery and user-info calls.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    #[serde(default)]
    pub discovery: DiscoveryPolicy,
}

impl IdentityProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Validation and caching rules applied to the discovery document.
#[derive(Deserialize, Clone, Debug)]
pub struct DiscoveryPolicy {
    /// Reject non-https authority and endpoints, loopback hosts excepted.
    #[serde(default = "default_true")]
    pub require_https: bool,
    /// The document's `issuer` must equal the configured authority.
    #[serde(default = "default_true")]
    pub validate_issuer_name: bool,
    /// Token and user-info endpoints must live on the authority's origin.
    #[serde(default = "default_true")]
    pub validate_endpoints: bool,
    /// How long a resolved document is reused. Zero disables caching.
    #[serde(default)]
    pub cache_ttl_seconds: u64,
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self {
            require_https: true,
            validate_issuer_name: true,
            validate_endpoints: true,
            cache_ttl_seconds: 0,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct MovieApiSettings {
    /// Base address of the movie catalog API (e.g. https://localhost:5001).
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    #[serde(default)]
    pub credentials: CatalogCredentials,
}

impl MovieApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// How the catalog channel obtains its credential.
#[derive(Deserialize, Clone, Default)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CatalogCredentials {
    /// The channel is already trusted (network policy, mTLS, sidecar).
    #[default]
    PreAuthorized,
    /// A separately managed service token sent as a bearer credential.
    StaticBearer { token: Secret<String> },
    /// OAuth2 client-credentials grant against the identity provider.
    ClientCredentials {
        client_id: String,
        client_secret: Secret<String>,
        #[serde(default)]
        scope: Option<String>,
        /// Falls back to the discovered token endpoint when unset.
        #[serde(default)]
        token_endpoint: Option<String>,
    },
}

impl std::fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogCredentials::PreAuthorized => f.write_str("PreAuthorized"),
            CatalogCredentials::StaticBearer { .. } => f.write_str("StaticBearer"),
            CatalogCredentials::ClientCredentials {
                client_id, scope, ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("scope", scope)
                .finish_non_exhaustive(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;

    // Support running from the workspace root as well as the crate directory
    let configuration_directory = if base_path.ends_with("movies-client") {
        base_path.join("config")
    } else {
        base_path.join("movies-client").join("config")
    };

    load_layered::<Settings>(&configuration_directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn credentials_default_to_pre_authorized() {
        let settings: MovieApiSettings =
            serde_json::from_value(serde_json::json!({ "base_url": "https://catalog" })).unwrap();

        assert!(matches!(settings.credentials, CatalogCredentials::PreAuthorized));
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn client_credentials_strategy_deserializes() {
        let credentials: CatalogCredentials = serde_json::from_value(serde_json::json!({
            "strategy": "client_credentials",
            "client_id": "movieClient",
            "client_secret": "secret",
            "scope": "movieAPI"
        }))
        .unwrap();

        match credentials {
            CatalogCredentials::ClientCredentials {
                client_id,
                client_secret,
                scope,
                token_endpoint,
            } => {
                assert_eq!(client_id, "movieClient");
                assert_eq!(client_secret.expose_secret(), "secret");
                assert_eq!(scope.as_deref(), Some("movieAPI"));
                assert!(token_endpoint.is_none());
            }
            other => panic!("unexpected strategy: {:?}", other),
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = CatalogCredentials::StaticBearer {
            token: Secret::new("super-secret".to_string()),
        };
        assert!(!format!("{:?}", credentials).contains("super-secret"));
    }

    #[test]
    fn discovery_policy_defaults_are_strict() {
        let settings: IdentityProviderSettings =
            serde_json::from_value(serde_json::json!({ "authority": "https://idp" })).unwrap();

        assert!(settings.discovery.require_https);
        assert!(settings.discovery.validate_issuer_name);
        assert!(settings.discovery.validate_endpoints);
        assert_eq!(settings.discovery.cache_ttl_seconds, 0);
    }
}
