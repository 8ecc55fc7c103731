#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use media_resolver::config::RateLimitConfig;
use media_resolver::infrastructure::cache::{CacheError, CacheResult, LinkCache};
use media_resolver::infrastructure::storage::{SignerError, UrlSigner, object_key};
use media_resolver::routes::app_router;
use media_resolver::state::AppState;

pub const TOKEN: &str = "secret";

/// Signer that hands out a new URL on every call and counts the calls.
#[derive(Default)]
pub struct CountingSigner {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl CountingSigner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UrlSigner for CountingSigner {
    async fn sign(&self, path: &str) -> Result<String, SignerError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail.load(Ordering::SeqCst) {
            return Err(SignerError::Presign {
                key: path.to_string(),
                reason: "SignatureDoesNotMatch".to_string(),
            });
        }

        Ok(format!(
            "https://s3.test/media/{}?X-Amz-Signature=sig{}",
            object_key(path),
            n
        ))
    }
}

/// In-memory cache with per-operation counters and failure switches.
#[derive(Default)]
pub struct CountingCache {
    entries: Mutex<HashMap<String, String>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    clears: AtomicUsize,
    fail_gets: AtomicBool,
    fail_sets: AtomicBool,
    unhealthy: AtomicBool,
}

impl CountingCache {
    pub fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn touched(&self) -> usize {
        self.gets() + self.sets() + self.clears()
    }

    pub fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    pub fn fail_sets(&self) {
        self.fail_sets.store(true, Ordering::SeqCst);
    }

    pub fn go_down(&self) {
        self.unhealthy.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LinkCache for CountingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionError("connection refused".into()));
        }
        Ok(self.entry(key))
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(CacheError::OperationError("read-only replica".into()));
        }
        self.insert(key, value);
        Ok(())
    }

    async fn clear(&self, key: &str) -> CacheResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.unhealthy.load(Ordering::SeqCst)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// A generous limit so that only rate limit tests ever see 429.
pub fn relaxed_limit() -> RateLimitConfig {
    RateLimitConfig {
        requests_per_second: 1000,
        burst_size: 1000,
    }
}

pub fn create_test_state(
    cache: Arc<dyn LinkCache>,
    signer: Arc<dyn UrlSigner>,
    rate_limit: RateLimitConfig,
) -> AppState {
    AppState::new(cache, signer, TOKEN, rate_limit)
}

/// Full application router over counting fakes.
pub fn create_test_server() -> (TestServer, Arc<CountingCache>, Arc<CountingSigner>) {
    create_test_server_with_limit(relaxed_limit())
}

pub fn create_test_server_with_limit(
    rate_limit: RateLimitConfig,
) -> (TestServer, Arc<CountingCache>, Arc<CountingSigner>) {
    let cache = Arc::new(CountingCache::default());
    let signer = Arc::new(CountingSigner::default());

    let state = create_test_state(cache.clone(), signer.clone(), rate_limit);
    let server = TestServer::new(app_router(state)).unwrap();

    (server, cache, signer)
}

pub fn location(response: &axum_test::TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .unwrap()
        .to_string()
}
