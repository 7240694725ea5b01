use crate::config::UrlConfig;
use crate::error::{AppError, AppResult};
use std::future::Future;
use tracing::debug;

/// Character set for generating slugs.
pub const DEFAULT_ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generator for random fixed-length slugs that are unique in the store.
#[derive(Debug, Clone)]
pub struct SlugGenerator {
    alphabet: Vec<char>,
    length: usize,
    max_attempts: u32,
}

impl SlugGenerator {
    /// Create a generator.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` for an empty alphabet, an alphabet
    /// with more than 255 symbols, a zero length, or a zero attempt cap.
    pub fn new(alphabet: &[char], length: usize, max_attempts: u32) -> AppResult<Self> {
        if alphabet.is_empty() || alphabet.len() > u8::MAX as usize {
            return Err(AppError::Configuration(
                "Slug alphabet must contain 1-255 characters".to_string(),
            ));
        }

        if length == 0 {
            return Err(AppError::Configuration(
                "Slug length must be greater than 0".to_string(),
            ));
        }

        if max_attempts == 0 {
            return Err(AppError::Configuration(
                "Slug generation needs at least one attempt".to_string(),
            ));
        }

        Ok(Self {
            alphabet: alphabet.to_vec(),
            length,
            max_attempts,
        })
    }

    /// Generator over [`DEFAULT_ALPHABET`] sized by the URL configuration
    pub fn from_config(config: &UrlConfig) -> AppResult<Self> {
        Self::new(DEFAULT_ALPHABET, config.slug_length, config.slug_max_attempts)
    }

    /// Draw one candidate: `length` independent uniform picks from the alphabet.
    pub fn candidate(&self) -> String {
        let length = self.length;
        nanoid::nanoid!(length, &self.alphabet)
    }

    /// Generate a slug for which `exists` returned `false`.
    ///
    /// `exists` is consulted once per candidate and should also report
    /// expired slugs, so that no slug is ever reissued. With a large
    /// alphabet/length space collisions are rare; with a tiny one the loop
    /// could spin indefinitely, which is why attempts are capped.
    ///
    /// The result is only known to be free at the moment of the check; a
    /// concurrent insert can still claim it before the caller does.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SlugSpaceExhausted` after `max_attempts` collisions,
    /// and propagates any error from `exists`.
    pub async fn generate<F, Fut>(&self, mut exists: F) -> AppResult<String>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = AppResult<bool>>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.candidate();

            if !exists(candidate.clone()).await? {
                return Ok(candidate);
            }

            debug!(attempt, candidate = %candidate, "Slug collision, drawing again");
        }

        Err(AppError::SlugSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}
