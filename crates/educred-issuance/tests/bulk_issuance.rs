//! End-to-end issuance scenarios over the in-process backend, plus a
//! delaying backend for timeout and concurrency behaviour.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use educred_core::{ContentId, MetadataUri, TokenId, WalletAddress};
use educred_issuance::{
    parse_csv, IssuanceBackend, IssuanceConfig, IssuanceError, Issuer, LocalBackend, SAMPLE_CSV,
};
use educred_registry::{Caller, Certificate, CertificateRegistry};
use educred_store::{MemoryMetadataStore, StoredObject};

const HEADER: &str = "student_name,email,wallet_address,course,institution,completion_date,grade";

fn signer() -> Caller {
    Caller::signer(WalletAddress::new(format!("0x{}", "c".repeat(40))).unwrap())
}

fn local_backend() -> LocalBackend {
    LocalBackend::new(
        Arc::new(MemoryMetadataStore::default()),
        CertificateRegistry::new(),
        signer(),
    )
}

/// Wraps a backend, delaying mints and counting calls.
#[derive(Clone)]
struct DelayingBackend {
    inner: LocalBackend,
    mint_delay: Duration,
    mints: Arc<AtomicUsize>,
    stores: Arc<AtomicUsize>,
}

impl DelayingBackend {
    fn new(mint_delay: Duration) -> Self {
        Self {
            inner: local_backend(),
            mint_delay,
            mints: Arc::default(),
            stores: Arc::default(),
        }
    }
}

impl IssuanceBackend for DelayingBackend {
    async fn store_document(
        &self,
        document: serde_json::Value,
    ) -> Result<StoredObject, IssuanceError> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.inner.store_document(document).await
    }

    async fn mint(
        &self,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Result<Certificate, IssuanceError> {
        tokio::time::sleep(self.mint_delay).await;
        self.mints.fetch_add(1, Ordering::SeqCst);
        self.inner.mint(owner, metadata_uri).await
    }

    async fn fetch_file(&self, id: ContentId) -> Result<Vec<u8>, IssuanceError> {
        self.inner.fetch_file(id).await
    }

    async fn certificate(&self, token_id: TokenId) -> Result<Option<Certificate>, IssuanceError> {
        self.inner.certificate(token_id).await
    }

    async fn tokens_of(&self, owner: WalletAddress) -> Result<Vec<TokenId>, IssuanceError> {
        self.inner.tokens_of(owner).await
    }
}

#[tokio::test]
async fn bulk_with_one_invalid_address() {
    let csv = format!(
        "{HEADER}\n\
         Ann,ann@x.io,0x1111111111111111111111111111111111111111,Rust,Uni,2024-01-01,A\n\
         Bob,bob@x.io,0xNOTANADDRESS,Rust,Uni,2024-01-01,B\n\
         Cy,cy@x.io,0x3333333333333333333333333333333333333333,Rust,Uni,2024-01-01,C\n"
    );
    let issuer = Issuer::new(local_backend(), IssuanceConfig::default());
    let report = issuer.issue_csv(&csv).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.outcomes.len(), 3);

    let rows: Vec<usize> = report.outcomes.iter().map(|o| o.row).collect();
    assert_eq!(rows, vec![1, 2, 3]);

    let failed = &report.outcomes[1];
    assert!(!failed.success);
    assert!(failed.token_id.is_none());
    assert!(failed.error.as_deref().unwrap().contains("invalid wallet address"));

    let first = report.outcomes[0].token_id.unwrap();
    let third = report.outcomes[2].token_id.unwrap();
    assert_ne!(first, third);
    assert_eq!(issuer.backend().registry().total_supply(), 2);
}

#[tokio::test]
async fn sample_template_issues_three_certificates() {
    let issuer = Issuer::new(local_backend(), IssuanceConfig::default());
    let report = issuer.issue_csv(SAMPLE_CSV).await.unwrap();
    assert_eq!(report.succeeded, 3);
    let ids: Vec<u64> = report
        .outcomes
        .iter()
        .map(|o| o.token_id.unwrap().value())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn missing_column_rejects_whole_batch_without_side_effects() {
    let backend = DelayingBackend::new(Duration::ZERO);
    let issuer = Issuer::new(backend.clone(), IssuanceConfig::default());
    let csv = "student_name,wallet_address,course,institution,completion_date,grade\n\
               Ann,0x1111111111111111111111111111111111111111,Rust,Uni,2024-01-01,A\n";
    let err = issuer.issue_csv(csv).await.unwrap_err();
    assert!(err.to_string().contains("email"));
    assert_eq!(backend.stores.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn skipped_rows_are_reported_not_processed() {
    let csv = format!(
        "{HEADER}\n\
         Ann,,0x1111111111111111111111111111111111111111,Rust,Uni,2024-01-01,A\n\
         ,bob@x.io,0x2222222222222222222222222222222222222222,Rust,Uni,2024-01-01,B\n"
    );
    let issuer = Issuer::new(local_backend(), IssuanceConfig::default());
    let report = issuer.issue_csv(&csv).await.unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line, 3);
    assert!(report.skipped[0].reason.contains("student_name"));
}

#[tokio::test]
async fn concurrent_bulk_preserves_input_order() {
    let mut csv = String::from(HEADER);
    for i in 0..12 {
        csv.push_str(&format!(
            "\nStudent {i},,0x{:040x},Course {i},Uni,2024-01-01,A",
            i + 1
        ));
    }
    let batch = parse_csv(&csv).unwrap();
    let config = IssuanceConfig {
        bulk_concurrency: 4,
        ..IssuanceConfig::default()
    };
    let issuer = Issuer::new(DelayingBackend::new(Duration::from_millis(5)), config);
    let report = issuer.issue_bulk(batch).await;

    assert_eq!(report.succeeded, 12);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.row, i + 1);
        assert_eq!(outcome.student_name, format!("Student {i}"));
    }
    let mut ids: Vec<u64> = report
        .outcomes
        .iter()
        .map(|o| o.token_id.unwrap().value())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 12);
}

#[tokio::test]
async fn slow_mint_times_out_as_retryable() {
    let config = IssuanceConfig {
        call_timeout: Duration::from_millis(20),
        ..IssuanceConfig::default()
    };
    let backend = DelayingBackend::new(Duration::from_millis(500));
    let issuer = Issuer::new(backend.clone(), config);
    let csv = format!("{HEADER}\nAnn,,0x1111111111111111111111111111111111111111,Rust,Uni,2024-01-01,A");
    let request = parse_csv(&csv).unwrap().rows.remove(0).request;

    let err = issuer.issue(&request).await.unwrap_err();
    assert!(matches!(err, IssuanceError::Timeout { operation: "mint", .. }));
    assert!(err.is_retryable());
    // The document was stored before the mint was attempted.
    assert_eq!(backend.stores.load(Ordering::SeqCst), 1);
    assert_eq!(backend.mints.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bulk_row_timeouts_do_not_abort_batch() {
    let config = IssuanceConfig {
        call_timeout: Duration::from_millis(20),
        inter_row_delay: Duration::from_millis(1),
        ..IssuanceConfig::default()
    };
    let issuer = Issuer::new(DelayingBackend::new(Duration::from_millis(200)), config);
    let report = issuer.issue_csv(SAMPLE_CSV).await.unwrap();
    assert_eq!(report.failed, 3);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.error.as_deref().unwrap().contains("timed out")));
}
