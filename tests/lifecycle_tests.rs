//! Slug lifecycle tests: shorten, resolve, stats and expiry against an
//! in-memory store.

mod common;

use common::{memory_service, slug, url, MemoryStore};
use slinky::db::UrlStore;
use slinky::error::AppError;
use slinky::services::{SlugGenerator, UrlService};
use std::sync::Arc;

mod shorten_tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_returns_shortened_url() {
        let (_store, service) = memory_service();

        let record = service.shorten(&url("https://www.test.com")).await.unwrap();
        let target = service.resolve(&slug(&record.slug)).await.unwrap();

        assert_eq!(target, "https://www.test.com/");
    }

    #[tokio::test]
    async fn test_same_url_twice_yields_one_row() {
        let (store, service) = memory_service();

        let first = service.shorten(&url("https://www.test.com")).await.unwrap();
        let second = service.shorten(&url("https://www.test.com/")).await.unwrap();

        assert_eq!(first.slug, second.slug);
        assert_eq!(store.rows_for("https://www.test.com/").await, 1);
    }

    #[tokio::test]
    async fn test_new_record_starts_unclicked_and_live() {
        let (_store, service) = memory_service();

        let record = service.shorten(&url("https://example.org/a")).await.unwrap();

        assert_eq!(record.click_count, 0);
        assert!(record.is_live());
        assert!(record.expires_at > record.created_at);
        assert_eq!(record.slug.len(), 6);
    }

    #[tokio::test]
    async fn test_generated_slug_never_collides_with_existing() {
        let store = Arc::new(MemoryStore::new(chrono::Duration::days(1)));
        // two-symbol space of length 1: "a" is taken, so only "b" is possible
        store.seed("a", "https://taken.example/").await;
        let generator = SlugGenerator::new(&['a', 'b'], 1, 50).unwrap();
        let service = UrlService::new(store.clone(), generator);

        let record = service.shorten(&url("https://fresh.example/")).await.unwrap();

        assert_eq!(record.slug, "b");
        assert_eq!(
            store.get("a").await.unwrap().original_url,
            "https://taken.example/"
        );
    }

    #[tokio::test]
    async fn test_exhausted_slug_space() {
        let store = Arc::new(MemoryStore::new(chrono::Duration::days(1)));
        store.seed("a", "https://taken.example/").await;
        let generator = SlugGenerator::new(&['a'], 1, 20).unwrap();
        let service = UrlService::new(store, generator);

        let err = service
            .shorten(&url("https://fresh.example/"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SlugSpaceExhausted { attempts: 20 }));
    }
}

mod resolve_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let (_store, service) = memory_service();

        let err = service.resolve(&slug("nope42")).await.unwrap_err();
        assert!(matches!(err, AppError::SlugNotFound(ref s) if s == "nope42"));

        let err = service.stats(&slug("nope42")).await.unwrap_err();
        assert!(matches!(err, AppError::SlugNotFound(_)));
    }

    #[tokio::test]
    async fn test_each_resolve_counts_one_click() {
        let (store, service) = memory_service();
        store.seed("aY2Pv8", "https://www.google.com/").await;

        for _ in 0..3 {
            service.resolve(&slug("aY2Pv8")).await.unwrap();
        }

        assert_eq!(service.stats(&slug("aY2Pv8")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stats_does_not_count_a_click() {
        let (store, service) = memory_service();
        store.seed("aY2Pv8", "https://www.google.com/").await;

        service.stats(&slug("aY2Pv8")).await.unwrap();
        service.stats(&slug("aY2Pv8")).await.unwrap();

        assert_eq!(store.get("aY2Pv8").await.unwrap().click_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_are_all_counted() {
        let (store, service) = memory_service();
        store.seed("Lt1fov", "https://www.youtube.com/").await;
        let service = Arc::new(service);

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.resolve(&slug("Lt1fov")).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "https://www.youtube.com/");
        }

        assert_eq!(service.stats(&slug("Lt1fov")).await.unwrap(), 50);
    }
}

mod expiry_tests {
    use super::*;

    #[tokio::test]
    async fn test_expired_slug_behaves_as_missing() {
        let (store, service) = memory_service();
        store.seed("aY2Pv8", "https://www.google.com/").await;
        service.resolve(&slug("aY2Pv8")).await.unwrap();

        store.expire("aY2Pv8").await;

        let err = service.resolve(&slug("aY2Pv8")).await.unwrap_err();
        assert!(matches!(err, AppError::SlugNotFound(_)));
        let err = service.stats(&slug("aY2Pv8")).await.unwrap_err();
        assert!(matches!(err, AppError::SlugNotFound(_)));

        // the failed lookup must not have touched the counter
        assert_eq!(store.get("aY2Pv8").await.unwrap().click_count, 1);
    }

    #[tokio::test]
    async fn test_expired_slug_still_reserved() {
        let (store, service) = memory_service();
        store.seed("aY2Pv8", "https://www.google.com/").await;
        store.expire("aY2Pv8").await;

        assert!(store.exists("aY2Pv8").await.unwrap());

        let fresh = service
            .shorten(&url("https://www.google.com/"))
            .await
            .unwrap();

        assert_ne!(fresh.slug, "aY2Pv8");
        assert_eq!(store.rows_for("https://www.google.com/").await, 2);
        assert_eq!(
            service.resolve(&slug(&fresh.slug)).await.unwrap(),
            "https://www.google.com/"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_expired_slug() {
        let (store, _service) = memory_service();
        store.seed("aY2Pv8", "https://www.google.com/").await;
        store.expire("aY2Pv8").await;

        let err = store
            .create(&url("https://other.example/"), "aY2Pv8")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateSlug(ref s) if s == "aY2Pv8"));
    }
}
