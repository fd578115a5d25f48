use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::{ExtractorError, ExtractorResult};
use crate::feed;
use crate::format::{self, RtmpFormat};
use crate::session::HttpClient;

/// Page host the extractor answers for.
pub const BASE_URL: &str = "https://videoonline.edu.lmu.de/";

static VALID_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://videoonline\.edu\.lmu\.de/(?:en|de)/node/(?P<id>[^/?#&]+)").unwrap()
});

/// Result of one extraction: the resolved formats, worst-first.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub id: String,
    pub title: String,
    pub formats: Vec<RtmpFormat>,
}

/// Resolves lecture pages on videoonline.edu.lmu.de into playable
/// RTMP stream descriptors.
pub struct MitschauExtractor {
    http: HttpClient,
    base: Url,
}

impl MitschauExtractor {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base: Url::parse(BASE_URL).unwrap(),
        }
    }

    /// Point the extractor at a different host. Test servers use this; the
    /// URL pattern of [`match_id`](Self::match_id) is unaffected.
    pub fn with_base(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Pull the node id out of a lecture page URL. Both the English and the
    /// German site prefix are accepted.
    pub fn match_id(url: &str) -> ExtractorResult<String> {
        VALID_URL
            .captures(url)
            .and_then(|captures| captures.name("id"))
            .map(|id| id.as_str().to_string())
            .ok_or_else(|| ExtractorError::UnsupportedUrl(url.to_string()))
    }

    /// Resolve a lecture page URL into its playable streams.
    pub async fn extract(&self, url: &str) -> ExtractorResult<Extraction> {
        let id = Self::match_id(url)?;
        self.extract_id(&id).await
    }

    /// Resolve a node id directly, skipping URL matching.
    pub async fn extract_id(&self, id: &str) -> ExtractorResult<Extraction> {
        let page_url = self
            .base
            .join(&format!("en/node/{id}"))
            .map_err(|_| ExtractorError::UnsupportedUrl(id.to_string()))?;

        self.http.ensure_session(&page_url, id).await;

        let raw = feed::fetch_feed(&self.http, &page_url, id).await?;
        let parsed = feed::parse_feed(&raw)?;

        let mut formats: Vec<RtmpFormat> = parsed
            .variants
            .iter()
            .map(|variant| RtmpFormat::build(&parsed.streamer, variant))
            .collect();
        format::sort_formats(&mut formats);

        tracing::debug!(id, count = formats.len(), "resolved formats");

        Ok(Extraction {
            id: id.to_string(),
            // The page itself is never scraped, so the title is a
            // deterministic placeholder.
            title: format!("Lecture {id}"),
            formats,
        })
    }
}

impl Default for MitschauExtractor {
    fn default() -> Self {
        Self::new(HttpClient::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn matches_english_and_german_pages() {
        let id = MitschauExtractor::match_id("https://videoonline.edu.lmu.de/en/node/8171").unwrap();
        assert_eq!(id, "8171");

        let id = MitschauExtractor::match_id("http://videoonline.edu.lmu.de/de/node/8171").unwrap();
        assert_eq!(id, "8171");
    }

    #[test]
    fn id_stops_at_query_and_fragment() {
        let id =
            MitschauExtractor::match_id("https://videoonline.edu.lmu.de/en/node/8171?autoplay=1")
                .unwrap();
        assert_eq!(id, "8171");

        let id = MitschauExtractor::match_id("https://videoonline.edu.lmu.de/en/node/8171#t=42")
            .unwrap();
        assert_eq!(id, "8171");
    }

    #[test]
    fn foreign_urls_are_unsupported() {
        let err =
            MitschauExtractor::match_id("https://media.ccc.de/v/32c3-7368-shopshifting").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedUrl);

        let err = MitschauExtractor::match_id("https://videoonline.edu.lmu.de/fr/node/8171")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedUrl);
    }
}
