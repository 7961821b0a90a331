use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Path prefixes that are never cached
const UNCACHED_PREFIXES: &[&str] = &[
    "/static",
    "/robots.txt",
    "/sitemap.xml",
    "/admin-panel",
    "/api",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub body: Arc<str>,
    pub etag: String,
}

impl CachedPage {
    pub fn new(body: String) -> Self {
        let etag = format!("\"{:x}\"", Sha256::digest(body.as_bytes()));
        Self {
            body: body.into(),
            etag,
        }
    }
}

/// Rendered pages keyed by normalized path
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CachedPage>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cacheable(path: &str) -> bool {
        !UNCACHED_PREFIXES.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub async fn get(&self, path: &str) -> Option<CachedPage> {
        self.entries.read().await.get(path).cloned()
    }

    pub async fn insert(&self, path: String, page: CachedPage) {
        self.entries.write().await.insert(path, page);
    }

    /// Write in the background; the response does not wait for the cache
    pub fn store(&self, path: String, page: CachedPage) {
        let cache = self.clone();
        tokio::spawn(async move {
            log::debug!("caching {}", path);
            cache.insert(path, page).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cacheable_paths() {
        assert!(ResponseCache::is_cacheable("/"));
        assert!(ResponseCache::is_cacheable("/desserts"));
        assert!(!ResponseCache::is_cacheable("/static/app.css"));
        assert!(!ResponseCache::is_cacheable("/robots.txt"));
        assert!(!ResponseCache::is_cacheable("/sitemap.xml"));
        assert!(!ResponseCache::is_cacheable("/admin-panel/key"));
        assert!(!ResponseCache::is_cacheable("/api/index-now-submit"));
    }

    #[test]
    fn test_cacheable_matches_whole_segments() {
        assert!(ResponseCache::is_cacheable("/static-menu"));
        assert!(ResponseCache::is_cacheable("/apizza"));
        assert!(ResponseCache::is_cacheable("/robots.txt-history"));
        assert!(!ResponseCache::is_cacheable("/static"));
        assert!(!ResponseCache::is_cacheable("/api"));
    }

    #[test]
    fn test_etag_is_content_hash() {
        let a = CachedPage::new("<p>menu</p>".to_string());
        let b = CachedPage::new("<p>menu</p>".to_string());
        let c = CachedPage::new("<p>other</p>".to_string());
        assert_eq!(a.etag, b.etag);
        assert_ne!(a.etag, c.etag);
        // quoted 64 hex chars
        assert_eq!(a.etag.len(), 66);
    }

    #[tokio::test]
    async fn test_store_is_eventually_visible() {
        let cache = ResponseCache::new();
        cache.store("/desserts".to_string(), CachedPage::new("body".to_string()));

        for _ in 0..50 {
            if cache.get("/desserts").await.is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.get("/desserts").await.unwrap().body.as_ref(), "body");
    }
}
