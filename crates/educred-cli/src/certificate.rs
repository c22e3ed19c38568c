//! # Certificate Subcommands
//!
//! `issue`, `bulk`, `verify`, `show`, `revoke` and `stats`.
//!
//! Issuance runs on the server by default. With `--client-side` the
//! issuance workflow runs in this process against the API instead: the
//! document is stored, then minted, each call bounded by
//! `EDUCRED_CALL_TIMEOUT_MS`. Verification defaults to client-side so the
//! content identifier is recomputed from the fetched document here.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use educred_client::EduCredClient;
use educred_core::TokenId;
use educred_issuance::{
    parse_csv, BulkReport, IssuanceConfig, IssuanceReceipt, IssueRequest, Issuer, MetadataCheck,
    VerificationReport, SAMPLE_CSV,
};

use crate::{print_json, read_bytes};

/// Arguments for `educred issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    #[arg(long, value_name = "NAME")]
    pub student_name: String,
    /// Recipient wallet address.
    #[arg(long, value_name = "ADDRESS")]
    pub wallet_address: String,
    #[arg(long)]
    pub course: String,
    #[arg(long)]
    pub institution: String,
    /// Completion date, `YYYY-MM-DD`.
    #[arg(long, value_name = "DATE")]
    pub completion_date: String,
    #[arg(long)]
    pub grade: String,
    /// Contact address. Not written into the metadata document.
    #[arg(long)]
    pub email: Option<String>,
    /// URL of an attachment already in the metadata store.
    #[arg(long, value_name = "URL")]
    pub image: Option<String>,
    /// Run the issuance workflow in this process.
    #[arg(long)]
    pub client_side: bool,
    #[arg(long)]
    pub json: bool,
}

impl IssueArgs {
    fn request(&self) -> IssueRequest {
        IssueRequest {
            student_name: self.student_name.clone(),
            email: self.email.clone(),
            wallet_address: self.wallet_address.clone(),
            course: self.course.clone(),
            institution: self.institution.clone(),
            completion_date: self.completion_date.clone(),
            grade: self.grade.clone(),
            image: self.image.clone(),
        }
    }
}

/// Arguments for `educred bulk`.
#[derive(Args, Debug)]
pub struct BulkArgs {
    /// CSV file with one certificate per row.
    #[arg(value_name = "FILE", required_unless_present = "sample")]
    pub file: Option<PathBuf>,
    /// Print a sample CSV and exit.
    #[arg(long, conflicts_with_all = ["dry_run", "client_side"])]
    pub sample: bool,
    /// Parse and report locally without issuing anything.
    #[arg(long)]
    pub dry_run: bool,
    /// Run the issuance workflow in this process.
    #[arg(long)]
    pub client_side: bool,
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `educred verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[arg(value_name = "TOKEN_ID")]
    pub token_id: TokenId,
    /// Trust the server's verification report instead of recomputing.
    #[arg(long)]
    pub server: bool,
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `educred show` and `educred revoke`.
#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(value_name = "TOKEN_ID")]
    pub token_id: TokenId,
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `educred stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}

fn issuer(client: &EduCredClient) -> Issuer<EduCredClient> {
    Issuer::new(client.clone(), IssuanceConfig::from_env())
}

/// Execute `educred issue`.
pub async fn run_issue(args: &IssueArgs, client: &EduCredClient) -> Result<u8> {
    let request = args.request();
    request.validate().context("invalid certificate request")?;

    let receipt = if args.client_side {
        issuer(client).issue(&request).await.context("issuance failed")?
    } else {
        client
            .certificates()
            .issue(&request)
            .await
            .context("issuance failed")?
    };

    if args.json {
        print_json(&receipt)?;
    } else {
        print_receipt(&receipt);
    }
    Ok(0)
}

fn print_receipt(receipt: &IssuanceReceipt) {
    println!(
        "OK: issued token_id={} owner={}",
        receipt.token_id, receipt.owner
    );
    println!("  issuer:           {}", receipt.issuer);
    println!("  metadata:         {}", receipt.metadata_uri);
    println!("  certificate hash: {}", receipt.certificate_hash);
    println!("  issued at:        {}", receipt.issued_at);
}

/// Execute `educred bulk`.
pub async fn run_bulk(args: &BulkArgs, client: &EduCredClient) -> Result<u8> {
    if args.sample {
        print!("{SAMPLE_CSV}");
        return Ok(0);
    }
    let Some(file) = &args.file else {
        bail!("a CSV file is required unless --sample is given");
    };
    let csv = String::from_utf8(read_bytes(file)?)
        .with_context(|| format!("{} is not UTF-8", file.display()))?;

    if args.dry_run {
        return dry_run(&csv, args.json);
    }

    let report = if args.client_side {
        issuer(client).issue_csv(&csv).await.context("bulk issuance failed")?
    } else {
        client
            .certificates()
            .bulk(csv)
            .await
            .context("bulk issuance failed")?
    };

    if args.json {
        print_json(&report)?;
    } else {
        print_bulk_report(&report);
    }
    Ok(bulk_exit_code(&report))
}

fn dry_run(csv: &str, json: bool) -> Result<u8> {
    let batch = parse_csv(csv).context("invalid CSV")?;
    if json {
        print_json(&serde_json::json!({
            "accepted": batch.rows.len(),
            "skipped": batch.skipped.iter().map(|s| serde_json::json!({
                "row": s.row,
                "line": s.line,
                "reason": s.reason,
            })).collect::<Vec<_>>(),
        }))?;
    } else {
        for row in &batch.rows {
            println!(
                "ROW {} (line {}): {} -> {}",
                row.row, row.line, row.request.student_name, row.request.wallet_address
            );
        }
        for skipped in &batch.skipped {
            println!("SKIP row {} (line {}): {}", skipped.row, skipped.line, skipped.reason);
        }
        println!(
            "{} row(s) accepted, {} skipped",
            batch.rows.len(),
            batch.skipped.len()
        );
    }
    Ok(if batch.skipped.is_empty() { 0 } else { 1 })
}

fn print_bulk_report(report: &BulkReport) {
    for outcome in &report.outcomes {
        match (&outcome.token_id, &outcome.error) {
            (Some(token_id), _) if outcome.success => println!(
                "OK: row {} {} -> token_id={token_id}",
                outcome.row, outcome.student_name
            ),
            (_, error) => println!(
                "FAIL: row {} {}: {}",
                outcome.row,
                outcome.student_name,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    for skipped in &report.skipped {
        println!("SKIP: row {} (line {}): {}", skipped.row, skipped.line, skipped.reason);
    }
    println!(
        "{} succeeded, {} failed, {} skipped",
        report.succeeded,
        report.failed,
        report.skipped.len()
    );
}

fn bulk_exit_code(report: &BulkReport) -> u8 {
    if report.failed == 0 && report.skipped.is_empty() {
        0
    } else {
        1
    }
}

/// Execute `educred verify`.
pub async fn run_verify(args: &VerifyArgs, client: &EduCredClient) -> Result<u8> {
    let report = if args.server {
        client
            .certificates()
            .report(args.token_id)
            .await
            .context("verification failed")?
    } else {
        issuer(client)
            .verify_certificate(args.token_id)
            .await
            .context("verification failed")?
    };

    if args.json {
        print_json(&report)?;
    } else {
        print_verification(&report);
    }
    Ok(if report.verified { 0 } else { 1 })
}

/// Print one verification report as `OK:` / `FAIL:` lines.
pub fn print_verification(report: &VerificationReport) {
    if !report.exists {
        println!("FAIL: token {} does not exist", report.token_id);
        return;
    }
    let verdict = if report.verified { "OK" } else { "FAIL" };
    let status = if report.is_valid { "valid" } else { "revoked" };
    println!("{verdict}: token {} is {status}", report.token_id);
    if let Some(owner) = &report.owner {
        println!("  owner:     {owner}");
    }
    if let Some(issuer) = &report.issuer {
        println!("  issuer:    {issuer}");
    }
    if let Some(issued_at) = &report.issued_at {
        println!("  issued at: {issued_at}");
    }
    if let Some(revoked_at) = &report.revoked_at {
        println!("  revoked:   {revoked_at}");
    }
    println!("  metadata:  {}", describe_metadata(&report.metadata));
    if let Some(document) = report.metadata.document() {
        let data = &document.certificate_data;
        println!("  student:   {}", data.student_name);
        println!("  course:    {} ({})", data.course, data.institution);
        println!("  completed: {} grade {}", data.completion_date, data.grade);
    }
}

fn describe_metadata(check: &MetadataCheck) -> String {
    match check {
        MetadataCheck::Skipped => "not checked".to_string(),
        MetadataCheck::Verified { content_id, .. } => format!("verified {content_id}"),
        MetadataCheck::BindingMismatch { content_id, .. } => {
            format!("{content_id} is intact but bound to a different owner")
        }
        MetadataCheck::Unavailable { reason } => format!("unavailable: {reason}"),
        MetadataCheck::IntegrityFailure { reason } => format!("integrity failure: {reason}"),
    }
}

/// Execute `educred show`.
pub async fn run_show(args: &TokenArgs, client: &EduCredClient) -> Result<u8> {
    let Some(certificate) = client
        .certificates()
        .get(args.token_id)
        .await
        .context("lookup failed")?
    else {
        println!("NOT FOUND: token {}", args.token_id);
        return Ok(1);
    };

    if args.json {
        print_json(&certificate)?;
    } else {
        println!("token {}: {}", certificate.token_id, certificate.status);
        println!("  owner:     {}", certificate.owner);
        println!("  issuer:    {}", certificate.issuer);
        println!("  metadata:  {}", certificate.metadata_uri);
        println!("  issued at: {}", certificate.issued_at);
        if let Some(revoked_at) = &certificate.revoked_at {
            println!("  revoked:   {revoked_at}");
        }
    }
    Ok(0)
}

/// Execute `educred revoke`.
pub async fn run_revoke(args: &TokenArgs, client: &EduCredClient) -> Result<u8> {
    let revocation = client
        .certificates()
        .revoke(args.token_id)
        .await
        .context("revocation failed")?;

    if args.json {
        print_json(&revocation)?;
    } else if revocation.newly_revoked {
        println!("OK: revoked token {}", args.token_id);
    } else {
        println!("OK: token {} was already revoked", args.token_id);
    }
    Ok(0)
}

/// Execute `educred stats`.
pub async fn run_stats(args: &StatsArgs, client: &EduCredClient) -> Result<u8> {
    let stats = client.stats().await.context("failed to fetch registry stats")?;
    if args.json {
        print_json(&stats)?;
    } else {
        println!(
            "total_supply={} valid={} revoked={}",
            stats.total_supply, stats.valid, stats.revoked
        );
    }
    Ok(0)
}
