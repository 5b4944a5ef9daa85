//! The token ownership validator.
//!
//! A validation attempt for a WebID either issues a challenge or checks an
//! outstanding one:
//!
//! 1. With no live secret in the store, a new one is generated and stored
//!    atomically, and the attempt ends pending. Nothing is fetched.
//! 2. With a live secret, the profile document is fetched and parsed. If it
//!    contains `<webid> solid:oidcIssuerRegistrationToken "secret"` the
//!    secret is deleted and the attempt succeeds; otherwise it ends pending
//!    and the secret is kept for the next attempt.
//!
//! Every pending outcome carries the exact line the caller has to publish.

use tracing::{debug, info, warn};

use crate::config::ValidatorConfig;
use crate::convert::StatementConverter;
use crate::error::{OwnershipError, PendingProof, PendingReason};
use crate::fetch::DocumentFetcher;
use crate::model::{Statement, WebId};
use crate::store::ExpiringStore;
use crate::token::{TokenGenerator, UuidTokens};

/// Proves control of a WebID profile through a published secret.
///
/// Holds no state of its own; concurrent validators sharing one store
/// agree on the outstanding secret for each WebID.
#[derive(Debug)]
pub struct TokenOwnershipValidator<C, S, F, G = UuidTokens> {
    converter: C,
    store: S,
    fetcher: F,
    tokens: G,
    config: ValidatorConfig,
}

impl<C, S, F> TokenOwnershipValidator<C, S, F, UuidTokens>
where
    C: StatementConverter,
    S: ExpiringStore,
    F: DocumentFetcher,
{
    /// Creates a validator issuing random UUID secrets.
    pub fn new(converter: C, store: S, fetcher: F, config: ValidatorConfig) -> Self {
        Self::with_tokens(converter, store, fetcher, UuidTokens, config)
    }
}

impl<C, S, F, G> TokenOwnershipValidator<C, S, F, G>
where
    C: StatementConverter,
    S: ExpiringStore,
    F: DocumentFetcher,
    G: TokenGenerator,
{
    /// Creates a validator with a custom secret generator.
    pub fn with_tokens(
        converter: C,
        store: S,
        fetcher: F,
        tokens: G,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            converter,
            store,
            fetcher,
            tokens,
            config,
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Runs one validation attempt for `webid`.
    ///
    /// # Errors
    ///
    /// Returns [`OwnershipError::Pending`] when ownership is not proven yet,
    /// displaying as the statement to publish, and [`OwnershipError::Store`]
    /// if the challenge store fails.
    pub async fn validate(&self, webid: &WebId) -> Result<(), OwnershipError> {
        let key = webid.as_str();

        let token = match self.store.get(key).await? {
            Some(token) => token,
            None => {
                let token = self.issue(webid).await?;
                let expected = Statement::ownership_proof(webid, &token);
                return Err(pending(expected, PendingReason::Issued));
            }
        };

        let expected = Statement::ownership_proof(webid, &token);
        if let Err(reason) = self.check(webid, &expected).await {
            return Err(pending(expected, reason));
        }

        if !self.store.delete(key).await? {
            debug!(%webid, "challenge already consumed or expired during verification");
        }
        info!(%webid, "verified WebID ownership");
        Ok(())
    }

    /// Stores a fresh secret unless a concurrent attempt got there first,
    /// and returns whichever secret is live.
    async fn issue(&self, webid: &WebId) -> Result<String, OwnershipError> {
        let candidate = self.tokens.generate();
        let live = self
            .store
            .insert_if_absent(webid.as_str(), &candidate, self.config.token_ttl)
            .await?;
        match live {
            None => {
                debug!(%webid, ttl = ?self.config.token_ttl, "issued ownership challenge");
                Ok(candidate)
            }
            Some(existing) => {
                debug!(%webid, "challenge issued concurrently, reusing it");
                Ok(existing)
            }
        }
    }

    /// Fetches the profile and looks for `expected` in it.
    async fn check(&self, webid: &WebId, expected: &Statement) -> Result<(), PendingReason> {
        let url = webid.document_url();
        let timeout = self.config.fetch_timeout;

        let document = match tokio::time::timeout(timeout, self.fetcher.fetch(&url)).await {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => {
                warn!(%webid, error = %e, "profile fetch failed");
                return Err(PendingReason::Transport(e.to_string()));
            }
            Err(_) => {
                warn!(%webid, ?timeout, "profile fetch timed out");
                return Err(PendingReason::Transport(format!(
                    "no response from {url} within {timeout:?}"
                )));
            }
        };

        if !document.is_success() {
            warn!(%webid, status = document.status, "profile fetch returned an error status");
            return Err(PendingReason::Transport(format!(
                "{url} answered with status {}",
                document.status
            )));
        }

        let Some(media_type) = document.media_type() else {
            warn!(%webid, "profile response has no content type");
            return Err(PendingReason::Transport(format!(
                "{url} did not declare a content type"
            )));
        };

        let statements = self
            .converter
            .convert(&document.body, &media_type, url.as_str())
            .map_err(|e| {
                warn!(%webid, %media_type, error = %e, "profile document could not be parsed");
                PendingReason::Conversion(e)
            })?;

        if statements.contains(expected) {
            return Ok(());
        }

        let competing = statements
            .iter()
            .filter(|s| s.subject == expected.subject && s.predicate == expected.predicate)
            .count();
        debug!(
            %webid,
            statements = statements.len(),
            competing,
            "expected token statement not found"
        );
        Err(PendingReason::StatementMissing)
    }
}

fn pending(expected: Statement, reason: PendingReason) -> OwnershipError {
    OwnershipError::Pending(PendingProof { expected, reason })
}
