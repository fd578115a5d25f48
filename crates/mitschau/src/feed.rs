//! The `bandwidth.rss` companion feed.
//!
//! Every lecture page publishes a small RSS document next to it that names
//! the RTMP streamer for the recording and one `media:content` entry per
//! encoded variant:
//!
//! ```xml
//! <rss version="2.0"
//!     xmlns:media="http://search.yahoo.com/mrss/"
//!     xmlns:jwplayer="http://developer.longtailvideo.com/trac/wiki/FlashFormats">
//!   <channel>
//!     <item>
//!       <media:group>
//!         <media:content url="/lmu/mitschau/wise16/gvwl1_161220l.mp4"
//!                        width="200" bitrate="150" />
//!       </media:group>
//!       <jwplayer:streamer>
//!         rtmp://flash5.lrz.de:1935/Mitschau/
//!       </jwplayer:streamer>
//!     </item>
//!   </channel>
//! </rss>
//! ```

use std::collections::HashMap;

use url::Url;

use crate::error::{ExtractorError, ExtractorResult};
use crate::session::HttpClient;
use crate::xml::{self, NsStep};

pub const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";
pub const JWPLAYER_NS: &str = "http://developer.longtailvideo.com/trac/wiki/FlashFormats";

const STREAMER_PATH: &[NsStep] = &[
    (None, "channel"),
    (None, "item"),
    (Some(JWPLAYER_NS), "streamer"),
];

const CONTENT_PATH: &[NsStep] = &[
    (None, "channel"),
    (None, "item"),
    (Some(MEDIA_NS), "group"),
    (Some(MEDIA_NS), "content"),
];

/// One encoded rendition as listed in the feed. `path` is root-relative
/// and keeps its leading `/` until the stream is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedVariant {
    pub path: String,
    pub width: u32,
    pub bitrate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Root address of the streaming server, whitespace-trimmed but
    /// otherwise untouched. Feed producers end it with `/`.
    pub streamer: String,
    /// Variants in document order. Ranking happens later.
    pub variants: Vec<FeedVariant>,
}

/// Fetch the raw feed for a lecture page. One GET, no retry; any transport
/// failure or non-2xx status aborts the extraction.
pub async fn fetch_feed(client: &HttpClient, page_url: &Url, id: &str) -> ExtractorResult<String> {
    let feed_url = format!("{}/bandwidth.rss", page_url.as_str().trim_end_matches('/'));
    tracing::debug!(id, "fetching bandwidth feed from {feed_url}");
    let feed_url = Url::parse(&feed_url).map_err(|_| ExtractorError::UnsupportedUrl(feed_url))?;
    client.get_text(feed_url).await
}

/// Parse a feed document into the streamer address and its variants.
///
/// Strict by contract: a missing or empty streamer, a `media:content`
/// without `url`, or a non-integer `width`/`bitrate` fails the whole call.
/// A feed with a streamer and zero variants is valid.
pub fn parse_feed(raw: &str) -> ExtractorResult<Feed> {
    let streamer = xml::first_text(raw, STREAMER_PATH)?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ExtractorError::malformed("missing jwplayer:streamer"))?;

    let mut variants = Vec::new();
    for attrs in xml::collect_attrs(raw, CONTENT_PATH)? {
        let path = attrs
            .get("url")
            .cloned()
            .ok_or_else(|| ExtractorError::malformed("media:content without url attribute"))?;
        let width = int_attr(&attrs, "width")?;
        let bitrate = int_attr(&attrs, "bitrate")?;
        variants.push(FeedVariant {
            path,
            width,
            bitrate,
        });
    }

    Ok(Feed { streamer, variants })
}

fn int_attr(attrs: &HashMap<String, String>, name: &str) -> ExtractorResult<u32> {
    attrs
        .get(name)
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| {
            ExtractorError::malformed(format!("media:content {name} is not a non-negative integer"))
        })
}
