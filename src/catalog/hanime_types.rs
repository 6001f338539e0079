/// hanime.tv API response types for deserialization.
///
/// These structures mirror the JSON response format of the catalog API.
/// Every field is optional so that a partially filled response still maps
/// to something useful.
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// The response of the search endpoint.
///
/// Hits are kept as raw JSON and decoded one by one, so a single malformed
/// hit does not take the others down with it.
#[derive(Debug, Deserialize)]
pub(super) struct HanimeSearchResponse {
    pub results: Option<Vec<Value>>,
}

/// A single search hit.
#[derive(Debug, Deserialize)]
pub(super) struct HanimeSearchHit {
    pub id: HanimeId,
    pub title: Option<String>,
    pub cover: Option<String>,
}

/// Item identifier, sent as either a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum HanimeId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for HanimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HanimeId::Number(id) => write!(f, "{id}"),
            HanimeId::Text(id) => f.write_str(id),
        }
    }
}

/// The response of the per-item detail endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct HanimeVideoResponse {
    pub video: Option<HanimeVideo>,
}

/// Descriptive fields of a catalog item.
#[derive(Debug, Deserialize)]
pub(super) struct HanimeVideo {
    pub description: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    /// Alternate titles (entries may be null)
    pub alt_titles: Option<Vec<Option<String>>>,
    /// ISO-8601 text or Unix seconds
    pub upload_date: Option<Value>,
}

/// The response of the per-item sources endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct HanimeSourcesResponse {
    pub sources: Option<Vec<HanimeSource>>,
    pub subtitles: Option<Vec<HanimeSubtitle>>,
}

/// A playable source.
#[derive(Debug, Deserialize)]
pub(super) struct HanimeSource {
    pub url: Option<String>,
}

/// A subtitle track.
#[derive(Debug, Deserialize)]
pub(super) struct HanimeSubtitle {
    pub lang: Option<String>,
    pub url: Option<String>,
    pub name: Option<String>,
}
