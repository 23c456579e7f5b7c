use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, CONTENT_LENGTH, CONTENT_TYPE, EXPIRES, LAST_MODIFIED, SERVER};
use serde::Serialize;

/// Resource metadata the origin reports for a URI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeInfo {
    pub content_type: Option<String>,
    pub length: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub server: Option<String>,
}

impl ProbeInfo {
    pub fn modified_at(modified: DateTime<Utc>) -> Self {
        Self {
            modified: Some(modified),
            ..Self::default()
        }
    }

    /// Build from HTTP response headers. Unparsable values are dropped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            content_type: header_str(headers, CONTENT_TYPE),
            length: header_str(headers, CONTENT_LENGTH).and_then(|v| v.parse().ok()),
            modified: header_date(headers, LAST_MODIFIED),
            expires: header_date(headers, EXPIRES),
            server: header_str(headers, SERVER),
        }
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

fn header_date(headers: &HeaderMap, name: HeaderName) -> Option<DateTime<Utc>> {
    header_str(headers, name)
        .and_then(|v| DateTime::parse_from_rfc2822(&v).ok())
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("10560"));
        headers.insert(LAST_MODIFIED, HeaderValue::from_static("Tue, 05 Mar 2024 14:02:11 GMT"));
        headers.insert(EXPIRES, HeaderValue::from_static("-1"));
        headers.insert(SERVER, HeaderValue::from_static("Apache"));

        assert_eq!(
            ProbeInfo::from_headers(&headers),
            ProbeInfo {
                content_type: Some("text/plain".to_string()),
                length: Some(10560),
                modified: Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 2, 11).unwrap()),
                expires: None,
                server: Some("Apache".to_string()),
            }
        );
    }

    #[test]
    fn test_from_empty_headers() {
        assert_eq!(ProbeInfo::from_headers(&HeaderMap::new()), ProbeInfo::default());
    }
}
