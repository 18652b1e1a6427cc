//! Cross-entity references ("applookup" fields)
//!
//! A reference field stores the REST URL of the target record, i.e.
//! `{base}/apps/{app_id}/records/{record_id}`. For display joins, only the record id is of interest,
//! since each reference field is statically typed to one target collection.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

/// Base URL of the LivingApps REST API, used for constructing references
pub const DEFAULT_BASE_URL: &str = "https://my.living-apps.de/rest/";

/// Characters to escape within a single URL path segment (the same set `url` uses)
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

/// Both components of a decoded reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordRef {
    pub app_id: String,
    pub record_id: String,
}

impl RecordRef {
    pub fn new(app_id: &str, record_id: &str) -> Self {
        Self {
            app_id: app_id.to_owned(),
            record_id: record_id.to_owned(),
        }
    }

    /// Decode a reference string.
    ///
    /// Returns None for anything that is not an absolute URL with a path ending in
    /// `apps/{app_id}/records/{record_id}` with non-empty ids. The host and any path prefix are
    /// ignored.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        Url::parse(reference).ok()?;
        // Segments are taken from the raw string, since `Url` resolves "." and ".." segments
        let without_suffix = reference.split(['?', '#']).next()?;
        let (_, after_scheme) = without_suffix.split_once("://")?;
        let path = &after_scheme[after_scheme.find('/')?..];
        let mut segments = path
            .split('/')
            .skip(1)
            .map(|s| percent_decode_str(s).decode_utf8().map(|s| s.into_owned()))
            .collect::<Result<Vec<String>, _>>()
            .ok()?;
        if segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        match segments.as_slice() {
            [.., apps, app_id, records, record_id]
                if apps == "apps"
                    && records == "records"
                    && !app_id.is_empty()
                    && !record_id.is_empty() =>
            {
                Some(Self::new(app_id, record_id))
            }
            _ => None,
        }
    }
}

/// Create the reference string for the given record, as stored in reference fields
pub fn create_record_url(app_id: &str, record_id: &str) -> String {
    format!(
        "{}apps/{}/records/{}",
        DEFAULT_BASE_URL,
        utf8_percent_encode(app_id, PATH_SEGMENT),
        utf8_percent_encode(record_id, PATH_SEGMENT)
    )
}

/// Extract the record id from a reference field value.
///
/// Absent, empty or malformed references result in None.
pub fn extract_record_id(reference: Option<&str>) -> Option<String> {
    reference
        .filter(|r| !r.trim().is_empty())
        .and_then(RecordRef::parse)
        .map(|r| r.record_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kursverwaltung_api_types::app_ids;

    #[test]
    fn test_create_record_url() {
        assert_eq!(
            create_record_url(app_ids::KURSE, "6985d0aa0000000000000001"),
            "https://my.living-apps.de/rest/apps/6985d03185d0dda331afe83a/records/6985d0aa0000000000000001"
        );
    }

    #[test]
    fn test_roundtrip() {
        for record_id in [
            "c1",
            "6985d0aa0000000000000001",
            "with/slash",
            "100%",
            "ä ö",
            "a?b#c",
            ".",
            "..",
        ] {
            let reference = create_record_url(app_ids::DOZENTEN, record_id);
            assert_eq!(
                extract_record_id(Some(&reference)).as_deref(),
                Some(record_id)
            );
        }
        assert_eq!(
            create_record_url(app_ids::RAEUME, ".."),
            "https://my.living-apps.de/rest/apps/6985d03133bdbb8911d48f57/records/.."
        );
        assert_ne!(
            create_record_url(app_ids::DOZENTEN, "a/b"),
            create_record_url(app_ids::DOZENTEN, "a%2Fb")
        );
    }

    #[test]
    fn test_parse_components() {
        let reference = RecordRef::parse(
            "https://example.org/api/v2/apps/6985d03133bdbb8911d48f57/records/r1/",
        )
        .unwrap();
        assert_eq!(reference, RecordRef::new(app_ids::RAEUME, "r1"));
    }

    #[test]
    fn test_absent_or_malformed() {
        assert_eq!(extract_record_id(None), None);
        assert_eq!(extract_record_id(Some("")), None);
        assert_eq!(extract_record_id(Some("   ")), None);
        assert_eq!(extract_record_id(Some("6985d0aa0000000000000001")), None);
        assert_eq!(extract_record_id(Some("not a url at all")), None);
        assert_eq!(extract_record_id(Some("mailto:someone@example.org")), None);
        assert_eq!(
            extract_record_id(Some("https://my.living-apps.de/rest/apps/x/records/")),
            None
        );
        assert_eq!(
            extract_record_id(Some("https://my.living-apps.de/rest/apps/x/entries/y")),
            None
        );
        assert_eq!(
            extract_record_id(Some("https://my.living-apps.de/rest/records/y")),
            None
        );
        assert_eq!(
            extract_record_id(Some("https://my.living-apps.de/rest/apps/x/records/?id=y")),
            None
        );
        assert_eq!(extract_record_id(Some("https://my.living-apps.de")), None);
    }
}
