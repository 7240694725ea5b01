//! Slug lifecycle: shorten, resolve, stats.
//!
//! [`UrlService`] is the only entry point callers need. It composes the
//! [`SlugGenerator`] and a [`UrlStore`]; each step is its own unit of work,
//! and the only error it retries is a lost race on slug insertion.

use crate::db::UrlStore;
use crate::error::{AppError, AppResult};
use crate::models::{UrlRecord, ValidSlug, ValidUrl};
use crate::services::short_code::SlugGenerator;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates slug creation and resolution on top of a [`UrlStore`]
pub struct UrlService {
    store: Arc<dyn UrlStore>,
    generator: SlugGenerator,
}

impl UrlService {
    pub fn new(store: Arc<dyn UrlStore>, generator: SlugGenerator) -> Self {
        Self { store, generator }
    }

    /// Shorten `url`, reusing a live record for the same URL when one exists.
    ///
    /// A fresh slug that loses the insert race to a concurrent request is
    /// regenerated once.
    ///
    /// # Errors
    ///
    /// `AppError::SlugSpaceExhausted` if no free slug could be drawn, and any
    /// pool or database error from the store.
    pub async fn shorten(&self, url: &ValidUrl) -> AppResult<UrlRecord> {
        if let Some(existing) = self.store.find_by_original_url(url).await? {
            debug!(slug = %existing.slug, "Reusing live record for URL");
            return Ok(existing);
        }

        match self.create_with_fresh_slug(url).await {
            Err(AppError::DuplicateSlug(slug)) => {
                warn!(slug = %slug, "Slug claimed concurrently, regenerating");
                self.create_with_fresh_slug(url).await
            }
            other => other,
        }
    }

    async fn create_with_fresh_slug(&self, url: &ValidUrl) -> AppResult<UrlRecord> {
        let store = &self.store;
        let slug = self
            .generator
            .generate(|candidate| async move { store.exists(&candidate).await })
            .await?;

        let record = self.store.create(url, &slug).await?;
        info!(slug = %record.slug, expires_at = %record.expires_at, "Created short URL");

        Ok(record)
    }

    /// Original URL behind `slug`, counting the click.
    ///
    /// The click is best-effort: if the increment fails the redirect still
    /// succeeds.
    ///
    /// # Errors
    ///
    /// `AppError::SlugNotFound` if the slug is unknown or expired.
    pub async fn resolve(&self, slug: &ValidSlug) -> AppResult<String> {
        let record = self.live_record(slug).await?;

        if let Err(e) = self.store.increment_click_count(slug).await {
            warn!(slug = %slug, "Failed to record click: {}", e);
        }

        Ok(record.original_url)
    }

    /// Click count of a live slug
    pub async fn stats(&self, slug: &ValidSlug) -> AppResult<i64> {
        Ok(self.live_record(slug).await?.click_count)
    }

    async fn live_record(&self, slug: &ValidSlug) -> AppResult<UrlRecord> {
        self.store
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::SlugNotFound(slug.to_string()))
    }
}
