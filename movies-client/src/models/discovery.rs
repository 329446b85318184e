use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::DiscoveryPolicy;

/// OpenID Connect discovery document, reduced to what this client uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    #[serde(default)]
    pub jwks_uri: Option<String>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
}

impl ProviderMetadata {
    /// Check the document against `policy` for the configured `authority`.
    ///
    /// The issuer is compared with the authority as configured, ignoring a
    /// trailing slash. Endpoints must share the authority's origin and sit
    /// under its path.
    pub fn validate(&self, authority: &str, policy: &DiscoveryPolicy) -> Result<(), String> {
        let authority_name = authority.trim_end_matches('/');
        let authority_url = Url::parse(authority)
            .map_err(|e| format!("invalid authority '{}': {}", authority, e))?;

        if policy.validate_issuer_name && self.issuer.trim_end_matches('/') != authority_name {
            return Err(format!(
                "issuer name '{}' does not match authority '{}'",
                self.issuer, authority_name
            ));
        }

        for (name, endpoint) in [
            ("token_endpoint", &self.token_endpoint),
            ("userinfo_endpoint", &self.userinfo_endpoint),
        ] {
            let url = Url::parse(endpoint)
                .map_err(|e| format!("invalid {} '{}': {}", name, endpoint, e))?;

            if policy.require_https && !is_secure(&url) {
                return Err(format!("{} '{}' does not use https", name, endpoint));
            }

            if policy.validate_endpoints
                && (url.origin() != authority_url.origin()
                    || !is_under_path(url.path(), authority_url.path()))
            {
                return Err(format!(
                    "{} '{}' is not on authority '{}'",
                    name, endpoint, authority_name
                ));
            }
        }

        Ok(())
    }
}

/// `path` equals `base` or is one of its descendants, on segment boundaries.
fn is_under_path(path: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// `https`, or any scheme on a loopback host.
pub(crate) fn is_secure(url: &Url) -> bool {
    if url.scheme() == "https" {
        return true;
    }
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(authority: &str) -> ProviderMetadata {
        ProviderMetadata {
            issuer: authority.to_string(),
            token_endpoint: format!("{}/connect/token", authority),
            userinfo_endpoint: format!("{}/connect/userinfo", authority),
            authorization_endpoint: None,
            jwks_uri: None,
            end_session_endpoint: None,
            scopes_supported: Vec::new(),
        }
    }

    #[test]
    fn accepts_matching_document() {
        let authority = "https://idp.example.com";
        let doc = metadata("https://idp.example.com");
        assert!(doc.validate(authority, &DiscoveryPolicy::default()).is_ok());
    }

    #[test]
    fn issuer_comparison_ignores_trailing_slash() {
        let authority = "https://idp.example.com/";
        let mut doc = metadata("https://idp.example.com");
        doc.issuer = "https://idp.example.com/".to_string();
        assert!(doc.validate(authority, &DiscoveryPolicy::default()).is_ok());
    }

    #[test]
    fn rejects_foreign_issuer() {
        let authority = "https://idp.example.com";
        let mut doc = metadata("https://idp.example.com");
        doc.issuer = "https://evil.example.com".to_string();

        let err = doc
            .validate(authority, &DiscoveryPolicy::default())
            .unwrap_err();
        assert!(err.contains("issuer name"));
    }

    #[test]
    fn rejects_plain_http_outside_loopback() {
        let authority = "http://idp.example.com";
        let doc = metadata("http://idp.example.com");

        let err = doc
            .validate(authority, &DiscoveryPolicy::default())
            .unwrap_err();
        assert!(err.contains("https"));
    }

    #[test]
    fn allows_plain_http_on_loopback() {
        let authority = "http://127.0.0.1:5005";
        let doc = metadata("http://127.0.0.1:5005");
        assert!(doc.validate(authority, &DiscoveryPolicy::default()).is_ok());
    }

    #[test]
    fn rejects_endpoint_on_other_origin() {
        let authority = "https://idp.example.com";
        let mut doc = metadata("https://idp.example.com");
        doc.userinfo_endpoint = "https://other.example.com/userinfo".to_string();

        let err = doc
            .validate(authority, &DiscoveryPolicy::default())
            .unwrap_err();
        assert!(err.contains("userinfo_endpoint"));

        let relaxed = DiscoveryPolicy {
            validate_endpoints: false,
            ..DiscoveryPolicy::default()
        };
        assert!(doc.validate(authority, &relaxed).is_ok());
    }

    #[test]
    fn issuer_matches_authority_with_explicit_default_port() {
        let authority = "https://idp.example.com:443";
        let doc = metadata("https://idp.example.com:443");
        assert!(doc.validate(authority, &DiscoveryPolicy::default()).is_ok());
    }

    #[test]
    fn endpoints_must_sit_under_authority_path() {
        let authority = "https://idp.example.com/tenant-a";
        let doc = metadata("https://idp.example.com/tenant-a");
        assert!(doc.validate(authority, &DiscoveryPolicy::default()).is_ok());

        for foreign in [
            "https://idp.example.com/tenant-b/connect/userinfo",
            "https://idp.example.com/tenant-ab/connect/userinfo",
        ] {
            let mut doc = metadata("https://idp.example.com/tenant-a");
            doc.userinfo_endpoint = foreign.to_string();

            let err = doc
                .validate(authority, &DiscoveryPolicy::default())
                .unwrap_err();
            assert!(err.contains("userinfo_endpoint"), "unexpected error: {}", err);
        }
    }
}
