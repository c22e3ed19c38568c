//! # Metadata Subcommand
//!
//! Store and fetch objects in the server's metadata store. Fetched objects
//! are checked against their identifier here as well, so a misbehaving
//! server cannot hand back altered bytes unnoticed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use educred_client::EduCredClient;
use educred_core::{sha256_bytes, sha256_digest, CanonicalBytes, ContentId};
use educred_store::content_id_from_url;

use crate::{print_json, read_bytes, read_json};

/// Arguments for `educred metadata`.
#[derive(Args, Debug)]
pub struct MetadataArgs {
    #[command(subcommand)]
    pub command: MetadataCommand,
}

/// Metadata subcommands.
#[derive(Subcommand, Debug)]
pub enum MetadataCommand {
    /// Canonicalize and store a JSON document.
    Put {
        /// JSON file to store.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Store a file as opaque bytes.
    Upload {
        /// File to store.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Fetch a stored document or file.
    Get {
        /// Content identifier or retrieval URL.
        #[arg(value_name = "ID")]
        id: String,
        /// Fetch raw bytes instead of a JSON document.
        #[arg(long)]
        raw: bool,
        /// Write to this path instead of stdout.
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Execute the metadata subcommand.
pub async fn run_metadata(args: &MetadataArgs, client: &EduCredClient) -> Result<u8> {
    match &args.command {
        MetadataCommand::Put { file } => cmd_put(client, file).await,
        MetadataCommand::Upload { file } => cmd_upload(client, file).await,
        MetadataCommand::Get { id, raw, output } => {
            cmd_get(client, id, *raw, output.as_deref()).await
        }
    }
}

async fn cmd_put(client: &EduCredClient, file: &Path) -> Result<u8> {
    let document = read_json(file)?;
    let stored = client
        .metadata()
        .store_document(&document)
        .await
        .context("store failed")?;
    println!("OK: stored id={} url={} size={}", stored.id, stored.url, stored.size);
    Ok(0)
}

async fn cmd_upload(client: &EduCredClient, file: &Path) -> Result<u8> {
    let bytes = read_bytes(file)?;
    let stored = client
        .metadata()
        .store_file(bytes)
        .await
        .context("upload failed")?;
    println!("OK: stored id={} url={} size={}", stored.id, stored.url, stored.size);
    Ok(0)
}

async fn cmd_get(
    client: &EduCredClient,
    raw_id: &str,
    raw: bool,
    output: Option<&Path>,
) -> Result<u8> {
    let id = parse_id(raw_id)?;

    let bytes = if raw {
        let Some(bytes) = client.metadata().fetch_file(&id).await.context("fetch failed")? else {
            println!("NOT FOUND: {id}");
            return Ok(1);
        };
        if ContentId::from_digest(&sha256_bytes(&bytes)) != id {
            println!("FAIL: fetched bytes do not match {id}");
            return Ok(1);
        }
        bytes
    } else {
        let Some(document) = client
            .metadata()
            .fetch_document(&id)
            .await
            .context("fetch failed")?
        else {
            println!("NOT FOUND: {id}");
            return Ok(1);
        };
        let canonical = CanonicalBytes::from_document(&document)
            .context("fetched document cannot be canonicalized")?;
        if ContentId::from_digest(&sha256_digest(&canonical)) != id {
            println!("FAIL: fetched document does not match {id}");
            return Ok(1);
        }
        match output {
            Some(_) => serde_json::to_vec_pretty(&document)?,
            None => {
                print_json(&document)?;
                return Ok(0);
            }
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(&bytes)
                .context("failed to write to stdout")?;
        }
    }
    Ok(0)
}

/// Accept a bare identifier or any gateway URL ending in one.
fn parse_id(raw: &str) -> Result<ContentId> {
    content_id_from_url(raw.trim()).with_context(|| format!("invalid content identifier: {raw}"))
}
