/// Data structures and traits for video catalog retrieval.
///
/// This module provides the output records handed to media-browsing front
/// ends (search results, detail records, episode references and resolved
/// streams), as well as the trait implemented by catalog backends.
mod hanime;
mod hanime_types;

pub use hanime::HanimeCatalog;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while talking to a catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The item URL does not carry a `videos/<id>` segment
    #[error("Invalid item URL: {0}")]
    InvalidInput(String),

    /// Request failed at the transport level or returned a non-success status
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream response lacked the fields we need
    #[error("Unexpected upstream response: {0}")]
    UpstreamShapeMismatch(String),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// A single entry of a keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Display title
    pub title: String,
    /// Cover image URL
    pub image: String,
    /// Item page URL, always `<site>/videos/<id>`
    pub href: String,
}

/// Descriptive record for a single catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRecord {
    /// Long-form description
    pub description: String,
    /// Known titles, joined with `", "`
    pub aliases: String,
    /// Upload date as `M/D/YYYY`, or `Unknown`
    pub airdate: String,
}

impl DetailRecord {
    /// The record returned whenever details could not be loaded.
    ///
    /// Downstream consumers match on these exact strings.
    pub fn unavailable() -> Self {
        Self {
            description: "Error loading description".to_string(),
            aliases: "Duration: Unknown".to_string(),
            airdate: "Aired: Unknown".to_string(),
        }
    }
}

/// Reference to a playable episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeRef {
    /// Item page URL
    pub href: String,
    /// Episode number
    pub number: u32,
}

/// A subtitle track attached to a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtitle {
    pub url: String,
    pub lang: String,
    pub name: String,
}

/// A resolved stream together with its English subtitle tracks.
///
/// Both fields serialize as `null` when absent; `subtitles` is never an
/// empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamResolution {
    pub stream: Option<String>,
    pub subtitles: Option<Vec<Subtitle>>,
}

/// Trait for catalog backends that answer the upstream queries.
///
/// Each method performs at most one request and reports every failure as a
/// `CatalogError`. Converting failures into fallback values is left to the
/// caller.
pub trait CatalogSource {
    /// Searches the catalog for the given keyword.
    ///
    /// # Arguments
    ///
    /// * `keyword` - Free text, sent percent-encoded
    ///
    /// # Returns
    ///
    /// The results in upstream order
    fn search(&self, keyword: &str) -> Result<Vec<SearchResult>, CatalogError>;

    /// Fetches the descriptive record of the item with the given id.
    fn details(&self, item_id: &str) -> Result<DetailRecord, CatalogError>;

    /// Resolves the playable stream of the item with the given id.
    ///
    /// HLS sources are preferred over MP4; an item offering neither is an
    /// error.
    fn stream(&self, item_id: &str) -> Result<StreamResolution, CatalogError>;
}
