//! Challenge-response proof that a caller controls a WebID profile document.
//!
//! The [`TokenOwnershipValidator`] issues a single-use secret for a WebID,
//! asks the caller to publish it as a statement inside their profile, and
//! verifies the statement by fetching and parsing that profile.
//!
//! # Entry Point
//!
//! ```no_run
//! use webid_ownership::{
//!     HttpFetcher, MemoryStore, RdfConverter, TokenOwnershipValidator, ValidatorConfig, WebId,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = TokenOwnershipValidator::new(
//!     RdfConverter,
//!     MemoryStore::new(),
//!     HttpFetcher::new(std::time::Duration::from_secs(10))?,
//!     ValidatorConfig::default(),
//! );
//! let webid = WebId::parse("https://alice.example/profile/card#me")?;
//! match validator.validate(&webid).await {
//!     Ok(()) => println!("verified"),
//!     Err(e) if e.is_pending() => println!("please add this statement: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Collaborators
//!
//! | Concern | Trait | Provided implementations |
//! |---------|-------|--------------------------|
//! | Secret storage | [`ExpiringStore`] | [`MemoryStore`], [`FileStore`] |
//! | Document retrieval | [`DocumentFetcher`] | [`HttpFetcher`] |
//! | RDF parsing | [`StatementConverter`] | [`RdfConverter`] |
//! | Secret generation | [`TokenGenerator`] | [`UuidTokens`] |

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod model;
pub mod store;
pub mod token;
pub mod validator;
pub mod vocab;

pub use config::ValidatorConfig;
pub use convert::{RdfConverter, StatementConverter};
pub use error::{
    ConvertError, FetchError, OwnershipError, PendingProof, PendingReason, StoreError,
};
pub use fetch::{DocumentFetcher, FetchedDocument, HttpFetcher};
pub use model::{Statement, Term, WebId, WebIdError};
pub use store::{ExpiringStore, FileStore, MemoryStore};
pub use token::{TokenGenerator, UuidTokens};
pub use validator::TokenOwnershipValidator;

/// URL type accepted by [`DocumentFetcher::fetch`].
pub use reqwest::Url;
