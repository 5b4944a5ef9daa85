//! Test doubles for `webid-ownership` collaborators.
//!
//! - [`MockFetcher`] serves canned responses and records every request.
//! - [`FixedTokens`] always issues the same secret; [`SequenceTokens`]
//!   issues a predictable series.
//! - [`CountingStore`] wraps a store and counts calls per operation.
//! - [`YieldingStore`] wraps a store and yields to the scheduler before every
//!   `insert_if_absent`, so joined callers interleave between lookup and
//!   insert.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use webid_ownership::{
    DocumentFetcher, ExpiringStore, FetchError, FetchedDocument, StoreError, TokenGenerator, Url,
};

/// What [`MockFetcher`] answers for a URL.
#[derive(Debug, Clone)]
pub enum Response {
    /// A response with status, media type and body.
    Document(FetchedDocument),
    /// A network-level failure.
    Fail(String),
    /// Never answers.
    Hang,
}

/// Fetcher returning canned responses. Unknown URLs fail like a refused
/// connection.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Response>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// An empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` as `text/turtle` with status 200 at `url`.
    pub fn serve_turtle(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.respond(url, Response::Document(FetchedDocument::ok(body, "text/turtle")));
    }

    /// Sets the response for `url`.
    pub fn respond(&self, url: &str, response: Response) {
        self.responses.lock().insert(url.to_owned(), response);
    }

    /// Number of fetches made so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        self.requests.lock().push(url.to_string());
        let response = self.responses.lock().get(url.as_str()).cloned();
        match response {
            Some(Response::Document(document)) => Ok(document),
            Some(Response::Fail(reason)) => Err(FetchError::Request {
                url: url.to_string(),
                reason,
            }),
            Some(Response::Hang) => std::future::pending().await,
            None => Err(FetchError::Request {
                url: url.to_string(),
                reason: "connection refused".to_owned(),
            }),
        }
    }
}

/// Issues the same secret every time.
#[derive(Debug, Clone)]
pub struct FixedTokens(pub String);

impl FixedTokens {
    /// Always issues `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenGenerator for FixedTokens {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

/// Issues `{prefix}-0`, `{prefix}-1`, ...
#[derive(Debug)]
pub struct SequenceTokens {
    prefix: String,
    next: AtomicUsize,
}

impl SequenceTokens {
    /// Starts the series at `{prefix}-0`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicUsize::new(0),
        }
    }
}

impl TokenGenerator for SequenceTokens {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{n}", self.prefix)
    }
}

/// Per-operation call counts of a [`CountingStore`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCalls {
    /// `get` calls.
    pub get: usize,
    /// `set` calls.
    pub set: usize,
    /// `insert_if_absent` calls.
    pub insert_if_absent: usize,
    /// `delete` calls.
    pub delete: usize,
}

/// Delegating store that counts calls.
#[derive(Debug)]
pub struct CountingStore<S> {
    inner: S,
    calls: Mutex<StoreCalls>,
}

impl<S> CountingStore<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(StoreCalls::default()),
        }
    }

    /// Calls observed so far.
    pub fn calls(&self) -> StoreCalls {
        *self.calls.lock()
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ExpiringStore> ExpiringStore for CountingStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.calls.lock().get += 1;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.calls.lock().set += 1;
        self.inner.set(key, value, ttl).await
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError> {
        self.calls.lock().insert_if_absent += 1;
        self.inner.insert_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.calls.lock().delete += 1;
        self.inner.delete(key).await
    }
}

/// Delegating store that yields once before each `insert_if_absent`.
#[derive(Debug, Default)]
pub struct YieldingStore<S> {
    inner: S,
}

impl<S> YieldingStore<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ExpiringStore> ExpiringStore for YieldingStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.inner.set(key, value, ttl).await
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.insert_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.delete(key).await
    }
}
