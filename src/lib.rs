//! hanime_bridge - Query the hanime.tv catalog for media-browsing front ends
//!
//! This library searches the catalog, loads item details, lists episodes and
//! resolves playable streams, reshaping every answer into the fixed JSON
//! contract the front end consumes. No operation ever returns an error:
//! failures degrade into a per-operation fallback value and are logged.

mod catalog;
mod config;
mod item_url;

pub use catalog::{
    CatalogError, CatalogSource, DetailRecord, EpisodeRef, HanimeCatalog, SearchResult,
    StreamResolution, Subtitle,
};
pub use config::{CatalogConfig, DEFAULT_API_URL, DEFAULT_SITE_URL};
pub use item_url::extract_item_id;

use log::{error, warn};
use serde::Serialize;

/// The four front-end operations on top of a catalog backend
///
/// Each operation performs at most one upstream request. The typed methods
/// return the output records with fallbacks already applied; the `*_json`
/// style methods (`search_results`, `extract_details`, `extract_episodes`,
/// `extract_stream_url`) return them serialized.
///
/// Fallbacks differ per operation and front ends match on them:
///
/// | Operation | Fallback |
/// |-----------|----------|
/// | search    | `[]` |
/// | details   | `[{"description":"Error loading description","aliases":"Duration: Unknown","airdate":"Aired: Unknown"}]` |
/// | episodes  | `[]` |
/// | stream    | `{"stream":null,"subtitles":null}` |
///
/// # Examples
///
/// ```no_run
/// use hanime_bridge::{CatalogConfig, MediaAdapter};
///
/// let adapter = MediaAdapter::hanime(CatalogConfig::default()).unwrap();
/// println!("{}", adapter.search_results("summer"));
/// println!("{}", adapter.extract_stream_url("https://hanime.tv/videos/42"));
/// ```
pub struct MediaAdapter<S = HanimeCatalog> {
    source: S,
}

impl MediaAdapter<HanimeCatalog> {
    /// Creates an adapter backed by the hanime.tv API.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn hanime(config: CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(HanimeCatalog::new(config)?))
    }
}

impl<S> MediaAdapter<S>
where
    S: CatalogSource,
{
    /// Creates an adapter on top of the given catalog backend.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Searches the catalog, yielding an empty list on failure.
    pub fn search(&self, keyword: &str) -> Vec<SearchResult> {
        self.source
            .search(keyword)
            .unwrap_or_else(|e| fallback("search", e, Vec::new()))
    }

    /// Loads the details of an item, yielding the sentinel record on failure.
    ///
    /// The result always holds exactly one record.
    pub fn details(&self, url: &str) -> Vec<DetailRecord> {
        let record = extract_item_id(url)
            .and_then(|id| self.source.details(&id))
            .unwrap_or_else(|e| fallback("details", e, DetailRecord::unavailable()));

        vec![record]
    }

    /// Lists the episodes of an item, yielding an empty list on failure.
    ///
    /// Items are single-episode, so a valid URL maps to one episode pointing
    /// back at the item page itself.
    pub fn episodes(&self, url: &str) -> Vec<EpisodeRef> {
        extract_item_id(url)
            .map(|_| {
                vec![EpisodeRef {
                    href: url.to_string(),
                    number: 1,
                }]
            })
            .unwrap_or_else(|e| fallback("episodes", e, Vec::new()))
    }

    /// Resolves the stream of an item, yielding null fields on failure.
    pub fn stream(&self, url: &str) -> StreamResolution {
        extract_item_id(url)
            .and_then(|id| self.source.stream(&id))
            .unwrap_or_else(|e| fallback("stream", e, StreamResolution::default()))
    }

    /// Search results as a JSON array.
    pub fn search_results(&self, keyword: &str) -> String {
        to_json(&self.search(keyword), "[]")
    }

    /// Item details as a single-element JSON array.
    pub fn extract_details(&self, url: &str) -> String {
        to_json(&self.details(url), DETAILS_FALLBACK_JSON)
    }

    /// Item episodes as a JSON array.
    pub fn extract_episodes(&self, url: &str) -> String {
        to_json(&self.episodes(url), "[]")
    }

    /// Resolved stream as a JSON object.
    pub fn extract_stream_url(&self, url: &str) -> String {
        to_json(&self.stream(url), STREAM_FALLBACK_JSON)
    }
}

const DETAILS_FALLBACK_JSON: &str = r#"[{"description":"Error loading description","aliases":"Duration: Unknown","airdate":"Aired: Unknown"}]"#;

const STREAM_FALLBACK_JSON: &str = r#"{"stream":null,"subtitles":null}"#;

/// Logs a swallowed failure and hands back the operation's fallback
fn fallback<T>(operation: &str, err: CatalogError, value: T) -> T {
    warn!("{operation} failed: {err}");
    value
}

fn to_json<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        error!("Failed to serialize output: {e}");
        fallback.to_string()
    })
}
