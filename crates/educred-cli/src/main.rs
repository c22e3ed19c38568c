//! # educred CLI Entry Point
//!
//! Parses arguments, resolves connection settings and dispatches to the
//! handler modules.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use educred_cli::certificate::{BulkArgs, IssueArgs, StatsArgs, TokenArgs, VerifyArgs};
use educred_cli::cid::CidArgs;
use educred_cli::config::{self, CliConfig, ConnectionArgs};
use educred_cli::metadata::MetadataArgs;
use educred_cli::owner::OwnerArgs;

/// EduCred: issue, verify and revoke educational certificates.
#[derive(Parser, Debug)]
#[command(name = "educred", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML file with connection settings.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store and fetch metadata documents and files.
    Metadata(MetadataArgs),
    /// Issue one certificate.
    Issue(IssueArgs),
    /// Issue certificates from a CSV file.
    Bulk(BulkArgs),
    /// Verify a certificate and its metadata.
    Verify(VerifyArgs),
    /// Show a registry entry.
    Show(TokenArgs),
    /// Revoke a certificate.
    Revoke(TokenArgs),
    /// Balance, holdings and verification by owner.
    Owner(OwnerArgs),
    /// Registry counters.
    Stats(StatsArgs),
    /// Compute the content identifier of a local file.
    Cid(CidArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    if let Commands::Cid(args) = &cli.command {
        return educred_cli::cid::run_cid(args);
    }

    let file = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let client = educred_cli::connect(config::resolve(&cli.connection, &file)?)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match &cli.command {
            Commands::Metadata(args) => educred_cli::metadata::run_metadata(args, &client).await,
            Commands::Issue(args) => educred_cli::certificate::run_issue(args, &client).await,
            Commands::Bulk(args) => educred_cli::certificate::run_bulk(args, &client).await,
            Commands::Verify(args) => educred_cli::certificate::run_verify(args, &client).await,
            Commands::Show(args) => educred_cli::certificate::run_show(args, &client).await,
            Commands::Revoke(args) => educred_cli::certificate::run_revoke(args, &client).await,
            Commands::Owner(args) => educred_cli::owner::run_owner(args, &client).await,
            Commands::Stats(args) => educred_cli::certificate::run_stats(args, &client).await,
            Commands::Cid(args) => educred_cli::cid::run_cid(args),
        }
    })
}
