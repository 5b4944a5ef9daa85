//! `webid-ownership`: proves control of a WebID profile document.
//!
//! Each run is one validation attempt. The first run for a WebID issues a
//! challenge and prints the statement to add to the profile; a later run,
//! once the statement is published, verifies it. Challenges are kept in a
//! JSON file so they survive between runs.
//!
//! **Usage:**
//! ```
//! webid-ownership <WEBID> [--store <path>] [--config <path>] [--ttl <secs>] [--timeout <secs>]
//! ```
//!
//! Exits 0 when ownership is verified, 2 while verification is pending, and
//! 1 on any other error.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use webid_ownership::{
    FileStore, HttpFetcher, OwnershipError, RdfConverter, TokenOwnershipValidator,
    ValidatorConfig, WebId,
};

/// Exit status while the statement is not yet published.
const EXIT_PENDING: i32 = 2;

/// Prove ownership of a WebID profile document.
#[derive(Parser)]
#[command(
    name = "webid-ownership",
    about = "Issue or verify a WebID ownership challenge"
)]
struct Args {
    /// The WebID to verify, e.g. https://alice.example/profile/card#me.
    webid: WebId,

    /// File holding outstanding challenges.
    #[arg(long, default_value = ".webid-ownership.json")]
    store: PathBuf,

    /// TOML file with `token_ttl_secs` and `fetch_timeout_secs`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Challenge lifetime in seconds (overrides the config file).
    #[arg(long)]
    ttl: Option<u64>,

    /// Profile fetch timeout in seconds (overrides the config file).
    #[arg(long)]
    timeout: Option<u64>,
}

fn load_config(
    path: Option<&Path>,
    ttl: Option<u64>,
    timeout: Option<u64>,
) -> Result<ValidatorConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ValidatorConfig::default(),
    };
    if let Some(secs) = ttl {
        config.token_ttl = Duration::from_secs(secs);
    }
    if let Some(secs) = timeout {
        config.fetch_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.ttl, args.timeout)?;
    tracing::debug!(?config, store = %args.store.display(), "starting validation");

    let validator = TokenOwnershipValidator::new(
        RdfConverter,
        FileStore::new(&args.store),
        HttpFetcher::new(config.fetch_timeout)?,
        config,
    );

    match validator.validate(&args.webid).await {
        Ok(()) => {
            println!("Verified ownership of {}", args.webid);
            Ok(())
        }
        Err(OwnershipError::Pending(proof)) => {
            println!("Ownership of {} is not verified yet ({}).", args.webid, proof.reason);
            println!("Add this statement to {} and run again:", args.webid.document_url());
            println!();
            println!("{}", proof.instruction());
            process::exit(EXIT_PENDING);
        }
        Err(e) => Err(e).context("Validation failed"),
    }
}
