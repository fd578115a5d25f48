//! Fixed-path queries over namespaced XML.
//!
//! The feed format is known ahead of time, so instead of a generic XPath
//! engine this resolves a fixed sequence of (namespace, local name) steps
//! against the streamed document: one lookup for a text node, one for
//! collecting the attribute sets of every element at a path.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{ExtractorError, ExtractorResult};

/// One path step below the document root: expected namespace (`None` for
/// unqualified elements) and local name.
pub(crate) type NsStep = (Option<&'static str>, &'static str);

fn step_matches(step: &NsStep, resolved: &ResolveResult, local: &[u8]) -> bool {
    let ns_ok = match (step.0, resolved) {
        (Some(expected), ResolveResult::Bound(Namespace(ns))) => *ns == expected.as_bytes(),
        (None, ResolveResult::Unbound) => true,
        _ => false,
    };
    ns_ok && local == step.1.as_bytes()
}

fn attributes(element: &BytesStart) -> ExtractorResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ExtractorError::malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ExtractorError::malformed(e.to_string()))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

/// Direct text content of the first element found at `path`, or `None` if
/// no element matches. Surrounding whitespace is dropped by the reader.
pub(crate) fn first_text(xml: &str, path: &[NsStep]) -> ExtractorResult<Option<String>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut matched = 0usize;
    let mut text = String::new();

    loop {
        match reader
            .read_resolved_event()
            .map_err(|e| ExtractorError::malformed(e.to_string()))?
        {
            (resolved, Event::Start(element)) => {
                depth += 1;
                if depth >= 2 {
                    let idx = depth - 2;
                    if matched == idx
                        && idx < path.len()
                        && step_matches(&path[idx], &resolved, element.local_name().as_ref())
                    {
                        matched += 1;
                    }
                }
            }
            (_, Event::Text(t)) => {
                if matched == path.len() && depth == path.len() + 1 {
                    text.push_str(
                        &t.unescape()
                            .map_err(|e| ExtractorError::malformed(e.to_string()))?,
                    );
                }
            }
            (_, Event::CData(t)) => {
                if matched == path.len() && depth == path.len() + 1 {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            (_, Event::End(_)) => {
                if matched == path.len() && depth == path.len() + 1 {
                    return Ok(Some(text));
                }
                if depth >= 2 && matched == depth - 1 {
                    matched -= 1;
                }
                depth = depth.saturating_sub(1);
            }
            (_, Event::Eof) => return Ok(None),
            _ => {}
        }
    }
}

/// Attribute maps of every element found at `path`, in document order.
pub(crate) fn collect_attrs(
    xml: &str,
    path: &[NsStep],
) -> ExtractorResult<Vec<HashMap<String, String>>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut matched = 0usize;
    let mut found = Vec::new();

    loop {
        match reader
            .read_resolved_event()
            .map_err(|e| ExtractorError::malformed(e.to_string()))?
        {
            (resolved, Event::Start(element)) => {
                depth += 1;
                if depth >= 2 {
                    let idx = depth - 2;
                    if matched == idx
                        && idx < path.len()
                        && step_matches(&path[idx], &resolved, element.local_name().as_ref())
                    {
                        matched += 1;
                        if matched == path.len() {
                            found.push(attributes(&element)?);
                        }
                    }
                }
            }
            (resolved, Event::Empty(element)) => {
                if depth >= 1 {
                    let idx = depth - 1;
                    if matched == idx
                        && idx + 1 == path.len()
                        && step_matches(&path[idx], &resolved, element.local_name().as_ref())
                    {
                        found.push(attributes(&element)?);
                    }
                }
            }
            (_, Event::End(_)) => {
                if depth >= 2 && matched == depth - 1 {
                    matched -= 1;
                }
                depth = depth.saturating_sub(1);
            }
            (_, Event::Eof) => return Ok(found),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";
    const JWPLAYER_NS: &str = "http://developer.longtailvideo.com/trac/wiki/FlashFormats";

    const SAMPLE: &str = r#"<rss version="2.0"
            xmlns:media="http://search.yahoo.com/mrss/"
            xmlns:jwplayer="http://developer.longtailvideo.com/trac/wiki/FlashFormats">
        <channel>
            <item>
                <media:group>
                    <media:content url="/a/low.mp4" width="200" bitrate="150" />
                    <media:content url="/a/high.mp4" width="900" bitrate="1000" />
                </media:group>
                <jwplayer:streamer>
                    rtmp://flash5.lrz.de:1935/Mitschau/
                </jwplayer:streamer>
            </item>
        </channel>
    </rss>"#;

    #[test]
    fn finds_namespaced_text() {
        let path: &[NsStep] = &[
            (None, "channel"),
            (None, "item"),
            (Some(JWPLAYER_NS), "streamer"),
        ];
        let text = first_text(SAMPLE, path).unwrap().unwrap();
        assert_eq!(text, "rtmp://flash5.lrz.de:1935/Mitschau/");
    }

    #[test]
    fn missing_path_yields_none() {
        let path: &[NsStep] = &[(None, "channel"), (Some(JWPLAYER_NS), "streamer")];
        assert!(first_text(SAMPLE, path).unwrap().is_none());
    }

    #[test]
    fn collects_attributes_in_document_order() {
        let path: &[NsStep] = &[
            (None, "channel"),
            (None, "item"),
            (Some(MEDIA_NS), "group"),
            (Some(MEDIA_NS), "content"),
        ];
        let attrs = collect_attrs(SAMPLE, path).unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0]["url"], "/a/low.mp4");
        assert_eq!(attrs[1]["url"], "/a/high.mp4");
        assert_eq!(attrs[1]["bitrate"], "1000");
    }

    #[test]
    fn namespace_must_match_not_just_local_name() {
        // jwplayer:content at the media:content path must not be picked up.
        let xml = r#"<rss xmlns:media="http://search.yahoo.com/mrss/"
                xmlns:jwplayer="http://developer.longtailvideo.com/trac/wiki/FlashFormats">
            <channel><item><media:group>
                <jwplayer:content url="/wrong.mp4" width="1" bitrate="1" />
            </media:group></item></channel>
        </rss>"#;
        let path: &[NsStep] = &[
            (None, "channel"),
            (None, "item"),
            (Some(MEDIA_NS), "group"),
            (Some(MEDIA_NS), "content"),
        ];
        assert!(collect_attrs(xml, path).unwrap().is_empty());
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        let err = first_text("<rss><channel></item></rss>", &[(None, "channel")]).unwrap_err();
        assert!(matches!(err, ExtractorError::MalformedFeed(_)));
    }
}
