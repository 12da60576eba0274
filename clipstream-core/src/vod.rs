//! VOD references: bare numeric ids or platform URLs that embed one.

use std::sync::LazyLock;

use regex::Regex;

use crate::ClipError;

static VOD_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/videos?/(\d+)").expect("static regex is valid"));

/// Identifies a source VOD, either directly by id or by the URL it was
/// shared as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VodReference {
    Id(String),
    Url(String),
}

impl VodReference {
    /// Parses user input into a VOD reference.
    ///
    /// Accepts a bare numeric id or an `http(s)` platform URL containing a
    /// `/videos/<id>` path segment.
    ///
    /// # Errors
    ///
    /// - `ClipError::InvalidVodReference` - input is neither form
    pub fn parse(input: &str) -> Result<Self, ClipError> {
        let trimmed = input.trim();

        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Ok(VodReference::Id(trimmed.to_string()));
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if VOD_URL_ID.is_match(trimmed) {
                return Ok(VodReference::Url(trimmed.to_string()));
            }
        }

        Err(ClipError::InvalidVodReference {
            input: input.to_string(),
        })
    }

    /// Reduces this reference to the platform's numeric video id.
    pub fn vod_id(&self) -> &str {
        match self {
            VodReference::Id(id) => id,
            VodReference::Url(url) => VOD_URL_ID
                .captures(url)
                .and_then(|captures| captures.get(1))
                .map(|id| id.as_str())
                .expect("Url variant always contains an id by construction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_id() {
        let vod = VodReference::parse("1234567890").unwrap();
        assert_eq!(vod, VodReference::Id("1234567890".to_string()));
        assert_eq!(vod.vod_id(), "1234567890");
    }

    #[test]
    fn test_parse_platform_url() {
        let vod = VodReference::parse("https://www.twitch.tv/videos/1234567890?t=1h2m").unwrap();
        assert_eq!(vod.vod_id(), "1234567890");

        let vod = VodReference::parse("https://m.twitch.tv/video/987654").unwrap();
        assert_eq!(vod.vod_id(), "987654");
    }

    #[test]
    fn test_parse_rejects_other_input() {
        for input in ["", "  ", "not-a-vod", "12ab34", "https://example.com/watch"] {
            assert!(
                matches!(
                    VodReference::parse(input),
                    Err(ClipError::InvalidVodReference { .. })
                ),
                "expected {input:?} to be rejected"
            );
        }
    }
}
