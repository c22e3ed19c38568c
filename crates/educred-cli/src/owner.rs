//! # Owner Subcommand
//!
//! Balance, holdings and verification for one wallet address. `verify`
//! covers every certificate the owner holds, revoked ones included.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use educred_client::EduCredClient;
use educred_core::WalletAddress;
use educred_issuance::{IssuanceConfig, Issuer};

use crate::certificate::print_verification;
use crate::print_json;

/// Arguments for `educred owner`.
#[derive(Args, Debug)]
pub struct OwnerArgs {
    #[command(subcommand)]
    pub command: OwnerCommand,
    #[arg(long, global = true)]
    pub json: bool,
}

/// Owner subcommands.
#[derive(Subcommand, Debug)]
pub enum OwnerCommand {
    /// Number of certificates held.
    Balance {
        #[arg(value_name = "ADDRESS")]
        owner: WalletAddress,
    },

    /// Certificates held, in mint order.
    Certificates {
        #[arg(value_name = "ADDRESS")]
        owner: WalletAddress,
    },

    /// Verify every certificate held.
    Verify {
        #[arg(value_name = "ADDRESS")]
        owner: WalletAddress,
        /// Trust the server's reports instead of recomputing.
        #[arg(long)]
        server: bool,
    },
}

/// Execute the owner subcommand.
pub async fn run_owner(args: &OwnerArgs, client: &EduCredClient) -> Result<u8> {
    match &args.command {
        OwnerCommand::Balance { owner } => {
            let balance = client
                .owners()
                .balance(owner)
                .await
                .context("balance lookup failed")?;
            if args.json {
                print_json(&serde_json::json!({ "owner": owner, "balance": balance }))?;
            } else {
                println!("{owner}: {balance} certificate(s)");
            }
            Ok(0)
        }

        OwnerCommand::Certificates { owner } => {
            let holdings = client
                .owners()
                .certificates(owner)
                .await
                .context("certificate lookup failed")?;
            if args.json {
                print_json(&holdings)?;
            } else {
                println!("{}: {} certificate(s)", holdings.owner, holdings.balance);
                for cert in &holdings.certificates {
                    println!(
                        "  token {} {} issued {} by {}",
                        cert.token_id, cert.status, cert.issued_at, cert.issuer
                    );
                }
            }
            Ok(0)
        }

        OwnerCommand::Verify { owner, server } => {
            let reports = if *server {
                client.owners().verify(owner).await.context("verification failed")?
            } else {
                Issuer::new(client.clone(), IssuanceConfig::from_env())
                    .verify_owner(owner)
                    .await
                    .context("verification failed")?
            };
            if args.json {
                print_json(&reports)?;
            } else if reports.is_empty() {
                println!("{owner} holds no certificates");
            } else {
                for report in &reports {
                    print_verification(report);
                }
            }
            let all_verified = reports.iter().all(|r| r.verified);
            Ok(if all_verified { 0 } else { 1 })
        }
    }
}
