//! Error types for the ownership proof and its collaborators.

use std::fmt;

use crate::model::Statement;

/// Result of a validation attempt that did not verify ownership.
#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    /// Verification is not complete yet; the caller must publish
    /// [`PendingProof::expected`] and retry. Displays as that exact line.
    #[error("{0}")]
    Pending(PendingProof),
    /// The challenge store failed outside its contract.
    #[error("challenge store failure: {0}")]
    Store(#[from] StoreError),
}

impl OwnershipError {
    /// True for the retryable "publish this statement" outcome.
    pub fn is_pending(&self) -> bool {
        matches!(self, OwnershipError::Pending(_))
    }

    /// The pending proof, if this is a pending outcome.
    pub fn pending(&self) -> Option<&PendingProof> {
        match self {
            OwnershipError::Pending(proof) => Some(proof),
            OwnershipError::Store(_) => None,
        }
    }
}

/// The statement still awaited in the profile document, and why.
#[derive(Debug)]
pub struct PendingProof {
    /// Statement that must appear in the profile document.
    pub expected: Statement,
    /// Why verification did not succeed on this attempt.
    pub reason: PendingReason,
}

impl PendingProof {
    /// The copy-pasteable line to publish.
    pub fn instruction(&self) -> String {
        self.expected.to_line()
    }
}

impl fmt::Display for PendingProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.", self.expected)
    }
}

/// Why a validation attempt ended pending.
#[derive(Debug)]
pub enum PendingReason {
    /// A new secret was issued on this call.
    Issued,
    /// The document was read but lacks the expected statement.
    StatementMissing,
    /// The document could not be retrieved.
    Transport(String),
    /// The document could not be parsed.
    Conversion(ConvertError),
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingReason::Issued => f.write_str("new challenge issued"),
            PendingReason::StatementMissing => f.write_str("statement not found in document"),
            PendingReason::Transport(reason) => write!(f, "document unavailable: {reason}"),
            PendingReason::Conversion(e) => write!(f, "document unreadable: {e}"),
        }
    }
}

/// Failure of an [`ExpiringStore`](crate::ExpiringStore) operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Persisted data could not be decoded or encoded.
    #[error("corrupt store data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Failure to retrieve a document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be configured.
    #[error("cannot build HTTP client: {0}")]
    Client(String),
    /// The request failed before a response was received.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Requested location.
        url: String,
        /// Transport diagnostic.
        reason: String,
    },
}

/// Failure to turn a document into statements.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// No parser is registered for the declared content type.
    #[error("unsupported content type `{0}`")]
    UnsupportedContentType(String),
    /// The body is not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    /// The body is not valid in the declared serialization.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The document location cannot serve as a base IRI.
    #[error("invalid base IRI `{0}`")]
    InvalidBase(String),
}
