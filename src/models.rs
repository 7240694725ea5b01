use crate::config::UrlConfig;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::sync::LazyLock;
use url::Url as UrlParser;
use validator::Validate;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("slug pattern is a valid regex"));

/// A shortened URL as stored in the `urls` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UrlRecord {
    pub slug: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub click_count: i64,
}

impl UrlRecord {
    /// A record is live while its expiry lies strictly in the future.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn is_live(&self) -> bool {
        self.is_live_at(Utc::now())
    }
}

/// Length limits applied when validating inbound URLs and slugs
#[derive(Debug, Clone, Copy)]
pub struct UrlRules {
    pub max_url_length: usize,
    pub max_slug_length: usize,
}

impl From<&UrlConfig> for UrlRules {
    fn from(config: &UrlConfig) -> Self {
        Self {
            max_url_length: config.max_url_length,
            max_slug_length: config.max_slug_length,
        }
    }
}

/// An absolute http(s) URL within the configured length limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidUrl(String);

impl ValidUrl {
    /// Parse and normalize a raw URL.
    ///
    /// The stored form is the parser's serialization, so `https://Example.com`
    /// and `https://example.com/` dedupe to the same record.
    pub fn parse(raw: &str, rules: &UrlRules) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidUrl("URL must not be empty".to_string()));
        }

        let parsed = UrlParser::parse(raw)
            .map_err(|e| AppError::InvalidUrl(format!("Invalid URL format: {}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(AppError::InvalidUrl("URL must include a host".to_string()));
        }

        let normalized = String::from(parsed);
        if normalized.len() > rules.max_url_length {
            return Err(AppError::InvalidUrl(format!(
                "URL exceeds {} characters",
                rules.max_url_length
            )));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An alphanumeric slug no longer than the configured maximum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidSlug(String);

impl ValidSlug {
    pub fn parse(raw: &str, rules: &UrlRules) -> AppResult<Self> {
        if raw.is_empty() || raw.len() > rules.max_slug_length {
            return Err(AppError::InvalidSlug(format!(
                "Slug must be 1-{} characters",
                rules.max_slug_length
            )));
        }

        if !SLUG_PATTERN.is_match(raw) {
            return Err(AppError::InvalidSlug(
                "Slug may only contain letters and digits".to_string(),
            ));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request to create a short URL
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(url(message = "Must be a valid URL"))]
    pub url: String,
}

/// Response after creating a short URL
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub slug: String,
    pub short_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const RULES: UrlRules = UrlRules {
        max_url_length: 64,
        max_slug_length: 8,
    };

    fn record(expires_at: DateTime<Utc>) -> UrlRecord {
        UrlRecord {
            slug: "aY2Pv8".to_string(),
            original_url: "https://www.google.com/".to_string(),
            created_at: Utc::now(),
            expires_at,
            click_count: 0,
        }
    }

    #[test]
    fn test_liveness() {
        let now = Utc::now();
        assert!(record(now + Duration::days(1)).is_live_at(now));
        assert!(!record(now - Duration::seconds(1)).is_live_at(now));
        // expiry exactly at `now` is already dead
        assert!(!record(now).is_live_at(now));
    }

    #[test]
    fn test_valid_url_normalizes() {
        let url = ValidUrl::parse("https://WWW.Test.com", &RULES).unwrap();
        assert_eq!(url.as_str(), "https://www.test.com/");
    }

    #[test]
    fn test_valid_url_rejects_bad_input() {
        assert!(ValidUrl::parse("", &RULES).is_err());
        assert!(ValidUrl::parse("example.com", &RULES).is_err());
        assert!(ValidUrl::parse("ftp://example.com", &RULES).is_err());
        assert!(ValidUrl::parse("javascript:alert(1)", &RULES).is_err());
    }

    #[test]
    fn test_valid_url_length_limit() {
        let long = format!("https://example.com/{}", "a".repeat(64));
        assert!(matches!(
            ValidUrl::parse(&long, &RULES),
            Err(AppError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_valid_slug() {
        assert!(ValidSlug::parse("aY2Pv8", &RULES).is_ok());
        assert!(ValidSlug::parse("", &RULES).is_err());
        assert!(ValidSlug::parse("abcdefghi", &RULES).is_err());
        assert!(ValidSlug::parse("abc-12", &RULES).is_err());
        assert!(ValidSlug::parse("abc 12", &RULES).is_err());
    }

    #[test]
    fn test_shorten_request_validation() {
        let ok = ShortenRequest {
            url: "https://example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = ShortenRequest {
            url: "not a url".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
