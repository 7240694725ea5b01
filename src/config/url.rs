use serde::Deserialize;

/// Upper bound on slug length imposed by the `urls.slug` column.
pub const SLUG_COLUMN_WIDTH: usize = 16;

/// Upper bound on URL length imposed by the `urls.original_url` column.
pub const URL_COLUMN_WIDTH: usize = 2048;

/// URL shortening configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UrlConfig {
    /// Length of randomly generated slugs
    pub slug_length: usize,

    /// Longest slug accepted on lookup
    pub max_slug_length: usize,

    /// Longest original URL accepted for shortening
    pub max_url_length: usize,

    /// Lifetime of newly created records, in days
    pub default_expiration_days: i64,

    /// Maximum number of collisions tolerated while generating a slug
    pub slug_max_attempts: u32,
}

impl UrlConfig {
    /// Validate URL configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.slug_length == 0 || self.slug_length > self.max_slug_length {
            return Err("SLUG_LENGTH must be between 1 and MAX_SLUG_LENGTH".to_string());
        }

        if self.max_slug_length > SLUG_COLUMN_WIDTH {
            return Err(format!(
                "MAX_SLUG_LENGTH cannot exceed {}",
                SLUG_COLUMN_WIDTH
            ));
        }

        if self.max_url_length == 0 || self.max_url_length > URL_COLUMN_WIDTH {
            return Err(format!(
                "MAX_URL_LENGTH must be between 1 and {}",
                URL_COLUMN_WIDTH
            ));
        }

        if self.default_expiration_days < 1 {
            return Err("DEFAULT_EXPIRATION_DAYS must be at least 1".to_string());
        }

        if self.slug_max_attempts < 1 || self.slug_max_attempts > 100 {
            return Err("SLUG_MAX_ATTEMPTS must be between 1 and 100".to_string());
        }

        Ok(())
    }

    /// Time-to-live applied to every new record
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.default_expiration_days)
    }
}
