use serde::{Deserialize, Serialize};

/// Movie record as exposed by the catalog API.
///
/// Passed through verbatim; fields are not validated here. Text fields
/// may be null or missing in the catalog's payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movie {
    pub id: i32,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub image_url: Option<String>,
    /// Kept as the catalog's literal timestamp string.
    pub release_date: Option<String>,
    pub owner: Option<String>,
}
