use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A single identity attribute returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Flatten a user-info JSON object into a claim list.
///
/// Strings are taken as-is, numbers and booleans in their textual form,
/// arrays yield one claim per element, nested objects are kept as compact
/// JSON and `null` values are skipped.
pub fn claims_from_json(document: Value) -> Result<Vec<Claim>, String> {
    let Value::Object(fields) = document else {
        return Err("user info response is not a JSON object".to_string());
    };

    let mut claims = Vec::with_capacity(fields.len());
    for (claim_type, value) in fields {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(value) = claim_value(item) {
                        claims.push(Claim::new(claim_type.clone(), value));
                    }
                }
            }
            other => {
                if let Some(value) = claim_value(other) {
                    claims.push(Claim::new(claim_type, value));
                }
            }
        }
    }
    Ok(claims)
}

fn claim_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// The authenticated user's claims keyed by claim type.
///
/// When the provider repeats a claim type (multi-valued claims such as
/// `role`), the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClaimSet(HashMap<String, String>);

impl ClaimSet {
    pub fn from_claims(claims: impl IntoIterator<Item = Claim>) -> Self {
        let mut entries = HashMap::new();
        for claim in claims {
            if let Some(previous) = entries.insert(claim.claim_type.clone(), claim.value) {
                tracing::debug!(
                    claim_type = %claim.claim_type,
                    discarded = %previous,
                    "Duplicate claim type, keeping the last value"
                );
            }
        }
        Self(entries)
    }

    pub fn get(&self, claim_type: &str) -> Option<&str> {
        self.0.get(claim_type).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_one_entry_per_claim() {
        let claims = vec![
            Claim::new("sub", "818727"),
            Claim::new("given_name", "Alice"),
            Claim::new("family_name", "Smith"),
        ];

        let set = ClaimSet::from_claims(claims);
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("given_name"), Some("Alice"));
        assert_eq!(set.get("missing"), None);
    }

    #[test]
    fn last_duplicate_wins() {
        let set = ClaimSet::from_claims(vec![
            Claim::new("role", "reader"),
            Claim::new("role", "admin"),
        ]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("role"), Some("admin"));
    }

    #[test]
    fn flattens_json_values() {
        let claims = claims_from_json(json!({
            "sub": "818727",
            "email_verified": true,
            "updated_at": 1311280970,
            "role": ["reader", "admin"],
            "address": { "country": "NL" },
            "nickname": null
        }))
        .unwrap();

        assert!(claims.contains(&Claim::new("sub", "818727")));
        assert!(claims.contains(&Claim::new("email_verified", "true")));
        assert!(claims.contains(&Claim::new("updated_at", "1311280970")));
        assert!(claims.contains(&Claim::new("role", "reader")));
        assert!(claims.contains(&Claim::new("role", "admin")));
        assert!(claims.contains(&Claim::new("address", r#"{"country":"NL"}"#)));
        assert!(!claims.iter().any(|c| c.claim_type == "nickname"));
        assert_eq!(claims.len(), 6);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(claims_from_json(json!(["sub", "818727"])).is_err());
        assert!(claims_from_json(json!("eyJhbGciOi")).is_err());
    }

    #[test]
    fn serializes_as_plain_object() {
        let set = ClaimSet::from_claims(vec![Claim::new("name", "Alice")]);
        assert_eq!(serde_json::to_value(&set).unwrap(), json!({ "name": "Alice" }));
    }
}
