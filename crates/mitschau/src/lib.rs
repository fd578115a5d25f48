//! Stream resolver for lecture recordings on videoonline.edu.lmu.de.
//!
//! Given a lecture page URL this crate makes sure a session cookie exists,
//! fetches the page's `bandwidth.rss` companion feed, and turns it into a
//! ranked list of RTMP stream descriptors a player or downloader can
//! consume:
//!
//! ```no_run
//! use mitschau::MitschauExtractor;
//!
//! # async fn run() -> mitschau::ExtractorResult<()> {
//! let extractor = MitschauExtractor::default();
//! let extraction = extractor
//!     .extract("https://videoonline.edu.lmu.de/en/node/8171")
//!     .await?;
//!
//! // worst-first; the last format is the best one
//! if let Some(best) = extraction.formats.last() {
//!     println!("{} @ {} kbit/s", best.url, best.bitrate);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Everything is resolved within a single call; the only state shared
//! across calls is the cookie jar inside [`HttpClient`].

pub mod error;
pub mod extractor;
pub mod feed;
pub mod format;
pub mod session;
mod xml;

pub use error::{ErrorKind, ExtractorError, ExtractorResult};
pub use extractor::{Extraction, MitschauExtractor};
pub use format::RtmpFormat;
pub use session::HttpClient;
