//! Item URL handling
//!
//! Item page URLs look like `https://hanime.tv/videos/1234`; the numeric
//! part addresses the per-item API endpoints.

use crate::catalog::CatalogError;
use regex_lite::Regex;
use std::sync::LazyLock;

static ITEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"videos/(\d+)").expect("item id pattern is valid"));

/// Extracts the numeric item id from an item page URL
///
/// The first `videos/` segment followed by one or more decimal digits wins.
/// The id is returned as text so arbitrarily long ids survive unchanged.
///
/// # Examples
///
/// ```
/// use hanime_bridge::extract_item_id;
///
/// assert_eq!(extract_item_id("https://hanime.tv/videos/42").unwrap(), "42");
/// assert!(extract_item_id("https://hanime.tv/browse").is_err());
/// ```
pub fn extract_item_id(url: &str) -> Result<String, CatalogError> {
    ITEM_ID
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| CatalogError::InvalidInput(url.to_string()))
}
