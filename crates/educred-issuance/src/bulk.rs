//! # Bulk Issuance
//!
//! CSV intake and batch execution.
//!
//! ## CSV format
//!
//! Comma-separated, one record per line, first line is the header. The
//! header must name every column in [`REQUIRED_COLUMNS`], in any order;
//! unknown columns are ignored. Fields are trimmed. Quoting and escaped
//! commas are not supported.
//!
//! Rows missing any required value (`email` may be empty) are skipped before
//! issuance and reported with their line number. Blank lines are ignored.
//!
//! ## Execution
//!
//! Each accepted row runs [`Issuer::issue`]. A row failure is recorded on
//! that row only. Rows run one at a time with an optional pause, or up to
//! `bulk_concurrency` at once; outcomes are always in input order.

use std::collections::HashMap;

use educred_core::TokenId;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::backend::IssuanceBackend;
use crate::error::IssuanceError;
use crate::request::IssueRequest;
use crate::workflow::Issuer;

/// Columns the header must contain.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "student_name",
    "email",
    "wallet_address",
    "course",
    "institution",
    "completion_date",
    "grade",
];

/// A template with three example rows.
pub const SAMPLE_CSV: &str = "\
student_name,email,wallet_address,course,institution,completion_date,grade
John Doe,john@example.com,0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b1,Blockchain Fundamentals,QUIN Academy,2024-01-15,A+
Jane Smith,jane@example.com,0x1234567890123456789012345678901234567890,Smart Contracts,QUIN Academy,2024-01-20,A
Bob Johnson,bob@example.com,0x9876543210987654321098765432109876543210,Web3 Development,QUIN Academy,2024-01-25,B+
";

/// An accepted CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based position among data rows.
    pub row: usize,
    /// 1-based line in the input; the header is line 1.
    pub line: usize,
    pub request: IssueRequest,
}

/// A row dropped during intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row: usize,
    pub line: usize,
    pub reason: String,
}

/// Parsed CSV input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvBatch {
    pub rows: Vec<CsvRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse CSV text into issuance requests.
///
/// Fails as a whole only when the header is missing or lacks a required
/// column.
pub fn parse_csv(input: &str) -> Result<CsvBatch, IssuanceError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| IssuanceError::Validation("CSV input is empty".to_string()))?;
    let header: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header.iter().any(|h| h == c))
        .collect();
    if !missing.is_empty() {
        return Err(IssuanceError::Validation(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut batch = CsvBatch::default();
    for (row, (line, text)) in lines.enumerate() {
        let row = row + 1;
        let values: Vec<&str> = text.split(',').map(str::trim).collect();
        let record: HashMap<&str, &str> = header
            .iter()
            .map(String::as_str)
            .zip(values.iter().copied().chain(std::iter::repeat("")))
            .collect();
        let field = |name: &str| record.get(name).copied().unwrap_or_default().to_string();

        let blank: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != "email" && field(*c).is_empty())
            .collect();
        if !blank.is_empty() {
            batch.skipped.push(SkippedRow {
                row,
                line,
                reason: format!("missing value for {}", blank.join(", ")),
            });
            continue;
        }

        let email = field("email");
        batch.rows.push(CsvRow {
            row,
            line,
            request: IssueRequest {
                student_name: field("student_name"),
                email: (!email.is_empty()).then_some(email),
                wallet_address: field("wallet_address"),
                course: field("course"),
                institution: field("institution"),
                completion_date: field("completion_date"),
                grade: field("grade"),
                image: None,
            },
        });
    }
    Ok(batch)
}

/// Result of one processed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row: usize,
    pub line: usize,
    pub student_name: String,
    pub wallet_address: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReport {
    /// One entry per processed row, in input order.
    pub outcomes: Vec<RowOutcome>,
    /// Rows dropped at intake.
    pub skipped: Vec<SkippedRow>,
    pub succeeded: usize,
    pub failed: usize,
}

impl<B: IssuanceBackend> Issuer<B> {
    /// Parse `csv` and issue every accepted row.
    pub async fn issue_csv(&self, csv: &str) -> Result<BulkReport, IssuanceError> {
        let batch = parse_csv(csv)?;
        Ok(self.issue_bulk(batch).await)
    }

    /// Issue every row of a parsed batch. Never fails as a whole.
    pub async fn issue_bulk(&self, batch: CsvBatch) -> BulkReport {
        let total = batch.rows.len();
        tracing::info!(
            rows = total,
            skipped = batch.skipped.len(),
            concurrency = self.config.bulk_concurrency,
            "starting bulk issuance"
        );

        let outcomes: Vec<RowOutcome> = if self.config.bulk_concurrency <= 1 {
            let mut outcomes = Vec::with_capacity(total);
            for (i, row) in batch.rows.iter().enumerate() {
                outcomes.push(self.issue_row(row).await);
                if i + 1 < total && !self.config.inter_row_delay.is_zero() {
                    tokio::time::sleep(self.config.inter_row_delay).await;
                }
            }
            outcomes
        } else {
            stream::iter(batch.rows)
                .map(|row| async move { self.issue_row(&row).await })
                .buffered(self.config.bulk_concurrency)
                .collect()
                .await
        };

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let failed = outcomes.len() - succeeded;
        tracing::info!(succeeded, failed, "bulk issuance finished");
        BulkReport {
            outcomes,
            skipped: batch.skipped,
            succeeded,
            failed,
        }
    }

    async fn issue_row(&self, row: &CsvRow) -> RowOutcome {
        let result = self.issue(&row.request).await;
        let (success, token_id, error) = match result {
            Ok(receipt) => (true, Some(receipt.token_id), None),
            Err(e) => {
                tracing::warn!(row = row.row, line = row.line, error = %e, "bulk row failed");
                (false, None, Some(e.to_string()))
            }
        };
        RowOutcome {
            row: row.row,
            line: row.line,
            student_name: row.request.student_name.clone(),
            wallet_address: row.request.wallet_address.clone(),
            success,
            token_id,
            error,
        }
    }
}
