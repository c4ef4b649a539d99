// Response shapes returned by the `/search` endpoint. Field names on the
// wire follow the API's snake_case keys; a few are renamed to read better
// on the Rust side. Every struct decodes tolerantly: missing keys (and
// `null` on string fields) fall back to their empty/zero value.

use serde::{Deserialize, Deserializer, Serialize};

/// One page of search results.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SearchResult {
    pub total_results: u64,
    pub page: u32,
    pub per_page: u32,
    #[serde(rename = "photos")]
    pub items: Vec<Photo>,
    /// URL of the following page, empty on the last one.
    #[serde(deserialize_with = "null_as_default")]
    pub next_page: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Photo {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// Page of the photo on the provider's website.
    #[serde(rename = "url")]
    pub page_url: String,
    #[serde(rename = "photographer")]
    pub photographer_name: String,
    pub photographer_url: String,
    pub photographer_id: u64,
    /// Hex colour such as `#978E82`.
    #[serde(rename = "avg_color", deserialize_with = "null_as_default")]
    pub average_color: String,
    #[serde(rename = "src")]
    pub sources: PhotoSources,
    pub liked: bool,
    #[serde(rename = "alt", deserialize_with = "null_as_default")]
    pub alt_text: String,
}

/// Alternate renditions of a photo. The API may leave any of them out.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PhotoSources {
    pub original: Option<String>,
    pub large2x: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
    pub portrait: Option<String>,
    pub landscape: Option<String>,
    pub tiny: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
