//! # Cid Subcommand
//!
//! Computes the content identifier the metadata store would assign to a
//! local file, without contacting a server. JSON documents are hashed in
//! canonical form; `--raw` hashes the bytes as they are.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use educred_core::{sha256_bytes, sha256_digest, CanonicalBytes, ContentId};

use crate::{read_bytes, read_json};

/// Arguments for `educred cid`.
#[derive(Args, Debug)]
pub struct CidArgs {
    /// File to hash.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Hash the file as opaque bytes instead of as a JSON document.
    #[arg(long)]
    pub raw: bool,

    /// Expected identifier. Exit code 1 when it differs.
    #[arg(long, value_name = "ID")]
    pub expect: Option<String>,
}

/// Execute the cid subcommand.
pub fn run_cid(args: &CidArgs) -> Result<u8> {
    let id = if args.raw {
        file_id(&args.file)?
    } else {
        document_id(&args.file)?
    };

    let Some(expected) = &args.expect else {
        println!("{id}");
        return Ok(0);
    };
    let expected: ContentId = expected
        .trim()
        .parse()
        .with_context(|| format!("invalid content identifier: {expected}"))?;
    if expected == id {
        println!("OK: {} matches {id}", args.file.display());
        Ok(0)
    } else {
        println!("FAIL: {} is {id}, expected {expected}", args.file.display());
        Ok(1)
    }
}

/// Identifier of a JSON document: hash of its canonical bytes.
pub fn document_id(path: &Path) -> Result<ContentId> {
    let value = read_json(path)?;
    let canonical = CanonicalBytes::from_document(&value)
        .with_context(|| format!("cannot canonicalize {}", path.display()))?;
    Ok(ContentId::from_digest(&sha256_digest(&canonical)))
}

/// Identifier of opaque bytes.
pub fn file_id(path: &Path) -> Result<ContentId> {
    let bytes = read_bytes(path)?;
    Ok(ContentId::from_digest(&sha256_bytes(&bytes)))
}
