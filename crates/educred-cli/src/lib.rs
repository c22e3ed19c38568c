//! # educred-cli: EduCred Command-Line Interface
//!
//! A clap-based client for a running EduCred server, plus local helpers
//! that need no server at all.
//!
//! ## Subcommands
//!
//! - `metadata`: store and fetch documents and files
//! - `issue`: issue one certificate
//! - `bulk`: issue certificates from a CSV file, or print a sample CSV
//! - `verify`: verify a certificate, recomputing the content identifier locally
//! - `show`: print a registry entry
//! - `revoke`: revoke a certificate
//! - `owner`: balance, holdings and verification by owner
//! - `stats`: registry counters
//! - `cid`: compute the content identifier of a local file
//!
//! ## Output
//!
//! Human-readable `OK:` / `FAIL:` lines by default, JSON with `--json`.
//! Handlers return the process exit code: `0` on success, `1` when a
//! check did not pass.

pub mod certificate;
pub mod cid;
pub mod config;
pub mod metadata;
pub mod owner;

use std::path::Path;

use anyhow::{Context, Result};
use educred_client::{ClientConfig, EduCredClient};
use serde::Serialize;

/// Build an API client from resolved configuration.
pub fn connect(config: ClientConfig) -> Result<EduCredClient> {
    tracing::debug!(?config, "connecting");
    EduCredClient::new(config).context("failed to build API client")
}

/// Read a whole file, naming it in the error.
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Read and parse a JSON file.
pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value> {
    let bytes = read_bytes(path)?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
