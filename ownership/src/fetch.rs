//! Profile document retrieval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;

use crate::error::FetchError;

/// RDF serializations the converter understands, in preference order.
const ACCEPT_RDF: &str = "text/turtle, application/n-triples;q=0.9";

/// A retrieved document, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Response body.
    pub body: Vec<u8>,
    /// Raw `Content-Type` header value, parameters included.
    pub content_type: Option<String>,
    /// HTTP status code.
    pub status: u16,
}

impl FetchedDocument {
    /// A `200 OK` response with the given body and media type.
    pub fn ok(body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some(content_type.into()),
            status: 200,
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The media type without parameters, lowercased.
    pub fn media_type(&self) -> Option<String> {
        let raw = self.content_type.as_deref()?;
        let essence = raw.split(';').next().unwrap_or_default().trim();
        (!essence.is_empty()).then(|| essence.to_ascii_lowercase())
    }
}

/// Retrieves documents by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Retrieves `url`. Non-success statuses are returned, not raised.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if no response could be obtained.
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError>;
}

#[async_trait]
impl<F: DocumentFetcher + ?Sized> DocumentFetcher for std::sync::Arc<F> {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        (**self).fetch(url).await
    }
}

/// HTTP(S) fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the TLS backend cannot initialise.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        let request_error = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_RDF)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        tracing::debug!(%url, status, content_type = ?content_type, "fetched profile document");

        let body = response.bytes().await.map_err(request_error)?.to_vec();
        Ok(FetchedDocument {
            body,
            content_type,
            status,
        })
    }
}
