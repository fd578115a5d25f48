use serde::Serialize;

use crate::feed::FeedVariant;

/// RTMP application the recordings live under. The server splits a stream
/// address into application and stream name, so the application shows up
/// both inside `url` and as its own field.
pub const RTMP_APP: &str = "Mitschau/";

/// Stream-name prefix the server expects for MP4 renditions.
pub const PLAY_PATH_PREFIX: &str = "mp4:";

/// A fully resolved, protocol-ready stream variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RtmpFormat {
    /// Absolute play address: streamer base + root-relative file path.
    pub url: String,

    pub width: u32,

    /// Total bitrate in kbit/s.
    pub bitrate: u32,

    /// RTMP application name, always [`RTMP_APP`].
    pub app: String,

    /// Stream name within the application, `mp4:` + file path.
    pub play_path: String,

    /// Deliver in real time instead of prefetching. The legacy server
    /// drops connections that read ahead of the stream clock.
    pub real_time: bool,
}

impl RtmpFormat {
    /// Resolve a feed variant against the streamer base. Pure; the streamer
    /// is expected to carry its trailing `/` as published in the feed.
    pub fn build(streamer: &str, variant: &FeedVariant) -> Self {
        let filename = variant.path.strip_prefix('/').unwrap_or(&variant.path);

        Self {
            url: format!("{streamer}{filename}"),
            width: variant.width,
            bitrate: variant.bitrate,
            app: RTMP_APP.to_string(),
            play_path: format!("{PLAY_PATH_PREFIX}{filename}"),
            real_time: true,
        }
    }
}

/// Order formats worst-first so consumers can pick "best" from the back.
///
/// Multi-key: delivery-protocol preference, then bitrate, then width.
/// `sort_by` is stable, so variants with equal keys keep their feed order.
pub fn sort_formats(formats: &mut [RtmpFormat]) {
    formats.sort_by(|a, b| {
        protocol_preference(&a.url)
            .cmp(&protocol_preference(&b.url))
            .then(a.bitrate.cmp(&b.bitrate))
            .then(a.width.cmp(&b.width))
    });
}

/// Plain progressive HTTP beats RTMP at equal quality: it needs no helper
/// program and supports range requests.
fn protocol_preference(url: &str) -> u8 {
    if url.starts_with("http:") || url.starts_with("https:") {
        2
    } else if url.starts_with("rtmp") {
        1
    } else {
        0
    }
}
