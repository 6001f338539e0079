/// hanime.tv catalog backend implementation.
use super::hanime_types::{
    HanimeSearchHit, HanimeSearchResponse, HanimeSource, HanimeSourcesResponse, HanimeSubtitle,
    HanimeVideo, HanimeVideoResponse,
};
use super::{CatalogError, CatalogSource, DetailRecord, SearchResult, StreamResolution, Subtitle};
use crate::config::CatalogConfig;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Catalog backend for the hanime.tv JSON API.
///
/// Every query is a single blocking GET against the configured API base.
/// The backend keeps no state between calls besides the HTTP client.
pub struct HanimeCatalog {
    client: reqwest::blocking::Client,
    config: CatalogConfig,
}

impl HanimeCatalog {
    /// Creates a backend for the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ClientBuild` if the TLS backend cannot be
    /// initialized.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(CatalogError::ClientBuild)?;

        Ok(Self { client, config })
    }

    /// Performs a GET request and parses the JSON body.
    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| CatalogError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::UpstreamUnavailable(format!(
                "HTTP {} {} from {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown"),
                url
            )));
        }

        response
            .json()
            .map_err(|e| CatalogError::UpstreamShapeMismatch(e.to_string()))
    }

    /// Converts a search response into result summaries.
    ///
    /// The item page URL is rebuilt from the site base and the item id.
    /// Hits that cannot be decoded (no usable id) are skipped; the rest keep
    /// their upstream order.
    fn convert_search(
        response: HanimeSearchResponse,
        site_base: &str,
    ) -> Result<Vec<SearchResult>, CatalogError> {
        let results = response.results.ok_or_else(|| {
            CatalogError::UpstreamShapeMismatch("No results in search response".to_string())
        })?;

        Ok(results
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<HanimeSearchHit>(raw) {
                Ok(hit) => Some(SearchResult {
                    title: hit.title.unwrap_or_default(),
                    image: hit.cover.unwrap_or_default(),
                    href: format!("{}/videos/{}", site_base, hit.id),
                }),
                Err(e) => {
                    warn!("Skipping malformed search hit: {e}");
                    None
                }
            })
            .collect())
    }

    /// Converts a video object into a detail record.
    fn convert_video(video: HanimeVideo) -> DetailRecord {
        let description = video
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "No description available".to_string());

        let aliases = [video.title, video.original_title]
            .into_iter()
            .chain(video.alt_titles.unwrap_or_default())
            .flatten()
            .filter(|alias| !alias.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        let airdate = match video.upload_date {
            None => "Unknown".to_string(),
            Some(timestamp) => match upload_day(&timestamp) {
                Some(date) => format_date(date),
                None => {
                    warn!("Unparseable upload date: {timestamp:?}");
                    "Unknown".to_string()
                }
            },
        };

        DetailRecord {
            description,
            aliases,
            airdate,
        }
    }

    /// Converts a sources response into a resolved stream.
    fn convert_sources(response: HanimeSourcesResponse) -> Result<StreamResolution, CatalogError> {
        let sources = response
            .sources
            .filter(|sources| !sources.is_empty())
            .ok_or_else(|| {
                CatalogError::UpstreamShapeMismatch("No sources in response".to_string())
            })?;

        let stream = select_stream(&sources).ok_or_else(|| {
            CatalogError::UpstreamShapeMismatch("No valid stream URL".to_string())
        })?;

        let subtitles: Vec<Subtitle> = response
            .subtitles
            .unwrap_or_default()
            .into_iter()
            .filter(|subtitle| subtitle.lang.as_deref() == Some("en"))
            .map(convert_subtitle)
            .collect();

        Ok(StreamResolution {
            stream: Some(stream),
            subtitles: (!subtitles.is_empty()).then_some(subtitles),
        })
    }
}

impl CatalogSource for HanimeCatalog {
    fn search(&self, keyword: &str) -> Result<Vec<SearchResult>, CatalogError> {
        let url = format!("{}/search", self.config.api_base());
        let response: HanimeSearchResponse = self.get_json(&url, &[("keyword", keyword)])?;

        Self::convert_search(response, self.config.site_base())
    }

    fn details(&self, item_id: &str) -> Result<DetailRecord, CatalogError> {
        let url = format!("{}/videos/{}", self.config.api_base(), item_id);
        let response: HanimeVideoResponse = self.get_json(&url, &[])?;

        let video = response.video.ok_or_else(|| {
            CatalogError::UpstreamShapeMismatch("No video object in response".to_string())
        })?;

        Ok(Self::convert_video(video))
    }

    fn stream(&self, item_id: &str) -> Result<StreamResolution, CatalogError> {
        let url = format!("{}/videos/{}/sources", self.config.api_base(), item_id);
        let response: HanimeSourcesResponse = self.get_json(&url, &[])?;

        Self::convert_sources(response)
    }
}

/// Picks the stream URL to play
///
/// The first HLS playlist wins; if there is none, the first MP4 file.
fn select_stream(sources: &[HanimeSource]) -> Option<String> {
    let first_with_suffix = |suffix: &str| {
        sources
            .iter()
            .filter_map(|source| source.url.as_deref())
            .find(|url| url.ends_with(suffix))
            .map(str::to_string)
    };

    first_with_suffix(".m3u8").or_else(|| first_with_suffix(".mp4"))
}

fn convert_subtitle(subtitle: HanimeSubtitle) -> Subtitle {
    Subtitle {
        url: subtitle.url.unwrap_or_default(),
        lang: subtitle.lang.unwrap_or_default(),
        name: subtitle.name.unwrap_or_else(|| "English".to_string()),
    }
}

/// Calendar day (UTC) of an upload timestamp
///
/// Numbers are Unix seconds (fractions dropped); text is RFC 3339 or starts
/// with a `YYYY-MM-DD` date.
fn upload_day(timestamp: &Value) -> Option<Date> {
    match timestamp {
        Value::Number(number) => {
            let seconds = number
                .as_i64()
                .or_else(|| number.as_f64().filter(|s| s.is_finite()).map(|s| s as i64))?;
            OffsetDateTime::from_unix_timestamp(seconds)
                .ok()
                .map(OffsetDateTime::date)
        }
        Value::String(text) => {
            if let Ok(datetime) = OffsetDateTime::parse(text, &Rfc3339) {
                return Some(datetime.to_offset(UtcOffset::UTC).date());
            }
            Date::parse(text.get(..10)?, format_description!("[year]-[month]-[day]")).ok()
        }
        _ => None,
    }
}

/// Formats a date as `M/D/YYYY`
fn format_date(date: Date) -> String {
    format!("{}/{}/{}", u8::from(date.month()), date.day(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serves a single HTTP response and hands back the request head.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buffer = [0; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = stream.read(&mut buffer).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (base, handle)
    }

    fn catalog_at(api_url: &str) -> HanimeCatalog {
        HanimeCatalog::new(CatalogConfig::default().with_api_url(api_url)).unwrap()
    }

    fn video(json: &str) -> HanimeVideo {
        serde_json::from_str(json).unwrap()
    }

    fn sources(json: &str) -> HanimeSourcesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_search_request_and_mapping() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"results":[{"id":42,"title":"T","cover":"c.jpg"},{"id":"7","title":"U","cover":"d.jpg"}]}"#,
        );

        let results = catalog_at(&format!("{base}/api")).search("a b&c").unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("GET /api/search?keyword=a+b%26c "));
        assert_eq!(
            results,
            vec![
                SearchResult {
                    title: "T".to_string(),
                    image: "c.jpg".to_string(),
                    href: "https://hanime.tv/videos/42".to_string(),
                },
                SearchResult {
                    title: "U".to_string(),
                    image: "d.jpg".to_string(),
                    href: "https://hanime.tv/videos/7".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_search_missing_results() {
        let (base, server) = serve_once("200 OK", r#"{"hits":[]}"#);
        let result = catalog_at(&base).search("x");
        server.join().unwrap();
        assert!(matches!(result, Err(CatalogError::UpstreamShapeMismatch(_))));
    }

    #[test]
    fn test_search_skips_malformed_hits() {
        let response: HanimeSearchResponse = serde_json::from_str(
            r#"{"results":[
                {"id":42,"title":"T","cover":"c.jpg"},
                {"title":"U","cover":"d.jpg"},
                {"id":null,"title":"V"},
                "not a hit",
                {"id":"7","title":"W","cover":null}
            ]}"#,
        )
        .unwrap();

        let results = HanimeCatalog::convert_search(response, "https://hanime.tv").unwrap();
        assert_eq!(
            results,
            vec![
                SearchResult {
                    title: "T".to_string(),
                    image: "c.jpg".to_string(),
                    href: "https://hanime.tv/videos/42".to_string(),
                },
                SearchResult {
                    title: "W".to_string(),
                    image: "".to_string(),
                    href: "https://hanime.tv/videos/7".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_search_non_success_status() {
        let (base, server) = serve_once("503 Service Unavailable", "{}");
        let result = catalog_at(&base).search("x");
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /search?keyword=x "));
        assert!(matches!(result, Err(CatalogError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_search_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = catalog_at(&base).search("x");
        assert!(matches!(result, Err(CatalogError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_non_success_status() {
        let (base, server) = serve_once("500 Internal Server Error", "{}");
        let result = catalog_at(&base).details("42");
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /videos/42 "));
        assert!(matches!(result, Err(CatalogError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = catalog_at(&base).stream("42");
        assert!(matches!(result, Err(CatalogError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_details_missing_video() {
        let (base, server) = serve_once("200 OK", r#"{"error":"not found"}"#);
        let result = catalog_at(&base).details("42");
        server.join().unwrap();
        assert!(matches!(result, Err(CatalogError::UpstreamShapeMismatch(_))));
    }

    #[test]
    fn test_stream_request() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"sources":[{"url":"https://cdn/x.m3u8"}],"subtitles":[]}"#,
        );
        let result = catalog_at(&base).stream("42").unwrap();
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /videos/42/sources "));
        assert_eq!(result.stream.as_deref(), Some("https://cdn/x.m3u8"));
        assert_eq!(result.subtitles, None);
    }

    #[test]
    fn test_aliases_skip_blank_titles() {
        let record = HanimeCatalog::convert_video(video(
            r#"{"title":"A","original_title":null,"alt_titles":["B",""]}"#,
        ));
        assert_eq!(record.aliases, "A, B");

        let record = HanimeCatalog::convert_video(video(
            r#"{"title":" ","original_title":"O","alt_titles":[null,"C"]}"#,
        ));
        assert_eq!(record.aliases, "O, C");

        let record = HanimeCatalog::convert_video(video("{}"));
        assert_eq!(record.aliases, "");
    }

    #[test]
    fn test_description_default() {
        let record = HanimeCatalog::convert_video(video(r#"{"description":"Plot"}"#));
        assert_eq!(record.description, "Plot");

        let record = HanimeCatalog::convert_video(video(r#"{"description":"  "}"#));
        assert_eq!(record.description, "No description available");

        let record = HanimeCatalog::convert_video(video("{}"));
        assert_eq!(record.description, "No description available");
    }

    #[test]
    fn test_airdate() {
        let record =
            HanimeCatalog::convert_video(video(r#"{"upload_date":"2023-04-07T12:30:00Z"}"#));
        assert_eq!(record.airdate, "4/7/2023");

        let record =
            HanimeCatalog::convert_video(video(r#"{"upload_date":"2021-12-25T23:00:00-02:00"}"#));
        assert_eq!(record.airdate, "12/26/2021");

        let record = HanimeCatalog::convert_video(video(r#"{"upload_date":"2020-01-15"}"#));
        assert_eq!(record.airdate, "1/15/2020");

        let record = HanimeCatalog::convert_video(video(r#"{"upload_date":1600000000}"#));
        assert_eq!(record.airdate, "9/13/2020");

        let record = HanimeCatalog::convert_video(video("{}"));
        assert_eq!(record.airdate, "Unknown");

        let record = HanimeCatalog::convert_video(video(r#"{"upload_date":"someday"}"#));
        assert_eq!(record.airdate, "Unknown");
    }

    #[test]
    fn test_airdate_loose_timestamps() {
        let record = HanimeCatalog::convert_video(video(r#"{"upload_date":1600000000.0}"#));
        assert_eq!(record.airdate, "9/13/2020");

        let record = HanimeCatalog::convert_video(video(r#"{"upload_date":"2019-03-02T08:15:00"}"#));
        assert_eq!(record.airdate, "3/2/2019");

        let record = HanimeCatalog::convert_video(video(
            r#"{"title":"A","upload_date":true}"#,
        ));
        assert_eq!(record.airdate, "Unknown");
        assert_eq!(record.aliases, "A");

        let record = HanimeCatalog::convert_video(video(r#"{"upload_date":null}"#));
        assert_eq!(record.airdate, "Unknown");
    }

    #[test]
    fn test_hls_preferred_over_mp4() {
        let resolution = HanimeCatalog::convert_sources(sources(
            r#"{"sources":[{"url":"x.mp4"},{"url":"y.m3u8"},{"url":"z.m3u8"}]}"#,
        ))
        .unwrap();
        assert_eq!(resolution.stream.as_deref(), Some("y.m3u8"));
    }

    #[test]
    fn test_mp4_fallback() {
        let resolution = HanimeCatalog::convert_sources(sources(
            r#"{"sources":[{"url":"a.webm"},{"url":null},{"url":"b.mp4"},{"url":"c.mp4"}]}"#,
        ))
        .unwrap();
        assert_eq!(resolution.stream.as_deref(), Some("b.mp4"));
    }

    #[test]
    fn test_no_playable_source() {
        let result =
            HanimeCatalog::convert_sources(sources(r#"{"sources":[{"url":"a.webm"}]}"#));
        assert!(matches!(result, Err(CatalogError::UpstreamShapeMismatch(_))));

        let result = HanimeCatalog::convert_sources(sources(r#"{"sources":[]}"#));
        assert!(result.is_err());

        let result = HanimeCatalog::convert_sources(sources("{}"));
        assert!(result.is_err());
    }

    #[test]
    fn test_english_subtitles_only() {
        let resolution = HanimeCatalog::convert_sources(sources(
            r#"{
                "sources":[{"url":"y.m3u8"}],
                "subtitles":[
                    {"lang":"en","url":"s1"},
                    {"lang":"fr","url":"s2"},
                    {"lang":"en-US","url":"s3"},
                    {"lang":"en","url":"s4","name":"English (CC)"}
                ]
            }"#,
        ))
        .unwrap();

        assert_eq!(
            resolution.subtitles,
            Some(vec![
                Subtitle {
                    url: "s1".to_string(),
                    lang: "en".to_string(),
                    name: "English".to_string(),
                },
                Subtitle {
                    url: "s4".to_string(),
                    lang: "en".to_string(),
                    name: "English (CC)".to_string(),
                },
            ])
        );
    }

    #[test]
    fn test_subtitles_null_when_none_match() {
        let resolution = HanimeCatalog::convert_sources(sources(
            r#"{"sources":[{"url":"y.m3u8"}],"subtitles":[{"lang":"fr","url":"s2"}]}"#,
        ))
        .unwrap();
        assert_eq!(resolution.subtitles, None);
    }
}
