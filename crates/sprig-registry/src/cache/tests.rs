//! Unit tests for the single-flight packument cache

use super::*;
use std::collections::HashMap;

fn sample_packument() -> Arc<Packument> {
    Arc::new(Packument {
        name: "test-package".to_string(),
        dist_tags: {
            let mut tags = HashMap::new();
            tags.insert("latest".to_string(), "1.0.0".to_string());
            tags
        },
        versions: HashMap::new(),
    })
}

#[test]
fn test_empty_cache() {
    let cache = PackumentCache::new();
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
    assert!(!cache.contains("https://registry.npmjs.org/test-package"));
}

#[test]
fn test_entry_returns_same_cell_for_same_url() {
    let cache = PackumentCache::new();
    let a = cache.entry("https://registry.npmjs.org/react");
    let b = cache.entry("https://registry.npmjs.org/react");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_entry_distinct_cells_for_distinct_urls() {
    let cache = PackumentCache::new();
    let a = cache.entry("https://registry.npmjs.org/react");
    let b = cache.entry("https://registry.npmjs.org/react-dom");
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_completed_entry_is_contained() {
    let cache = PackumentCache::new();
    let url = "https://registry.npmjs.org/test-package";

    let cell = cache.entry(url);
    assert!(!cache.contains(url));

    cell.get_or_init(|| async { Ok(sample_packument()) }).await;
    assert!(cache.contains(url));
}

#[tokio::test]
async fn test_failures_are_memoized() {
    let cache = PackumentCache::new();
    let url = "https://registry.npmjs.org/broken";

    let cell = cache.entry(url);
    cell.get_or_init(|| async {
        Err(SprigError::Registry {
            package: "broken".to_string(),
            message: "boom".to_string(),
        })
    })
    .await;

    // A later caller sees the cached failure without re-running the init
    let outcome = cache
        .entry(url)
        .get_or_init(|| async { panic!("must not refetch") })
        .await
        .clone();
    assert!(matches!(outcome, Err(SprigError::Registry { .. })));
}

#[tokio::test]
async fn test_clear_drops_entries() {
    let cache = PackumentCache::new();
    let url = "https://registry.npmjs.org/test-package";
    cache
        .entry(url)
        .get_or_init(|| async { Ok(sample_packument()) })
        .await;

    cache.clear();
    assert!(cache.is_empty());
    assert!(!cache.contains(url));
}
