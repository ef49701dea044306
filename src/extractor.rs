use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Pulls an identifier out of a raw result page.
///
/// Implementations get the full, unparsed response body and return the first
/// identifier they recognise, or `None` when the page has nothing usable.
pub trait Extractor: Send + Sync {
    fn extract(&self, payload: &[u8]) -> Option<String>;
}

// ASCII word characters only, the embedded ids never carry anything else.
static VIDEO_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoId":"((?-u:\w)+)""#).expect("video id pattern is valid"));

/// Finds the first `"videoId":"<token>"` in a search results page.
#[derive(Debug, Default, Clone, Copy)]
pub struct VideoIdExtractor;

impl Extractor for VideoIdExtractor {
    fn extract(&self, payload: &[u8]) -> Option<String> {
        let captures = VIDEO_ID_PATTERN.captures(payload)?;
        let token = captures.get(1)?;
        String::from_utf8(token.as_bytes().to_vec()).ok()
    }
}

#[test]
fn test_extracts_first_video_id() {
    let extractor = VideoIdExtractor;

    let page = br#"{"contents":[{"videoId":"XyZ_123","title":"a"},{"videoId":"second1"}]}"#;
    assert_eq!(extractor.extract(page), Some("XyZ_123".to_string()));

    assert_eq!(extractor.extract(b"<html>no results here</html>"), None);
    assert_eq!(extractor.extract(b""), None);

    // the token has to be non-empty
    assert_eq!(extractor.extract(br#""videoId":"""#), None);

    // token must be word characters right up to the closing quote
    assert_eq!(extractor.extract(br#""videoId":"abc-def""#), None);
    assert_eq!(extractor.extract("\"videoId\":\"héllo\"".as_bytes()), None);
}

#[test]
fn test_extract_ignores_invalid_utf8_around_match() {
    let extractor = VideoIdExtractor;
    let mut page = vec![0xff, 0xfe, b' '];
    page.extend_from_slice(br#""videoId":"dQw4w9WgXcQ""#);
    page.push(0xc3);
    assert_eq!(extractor.extract(&page), Some("dQw4w9WgXcQ".to_string()));
}
