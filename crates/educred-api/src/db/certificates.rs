//! Certificate persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `certificates` table.
//! Registry rules (sequential ids, signer checks, terminal revocation) are
//! enforced in memory before anything reaches SQL.

use chrono::{DateTime, Utc};
use educred_core::{MetadataUri, Timestamp, TokenId, WalletAddress};
use educred_registry::{Certificate, CertificateStatus};
use sqlx::PgPool;

/// Insert a newly minted certificate.
pub async fn insert(pool: &PgPool, record: &Certificate) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO certificates (token_id, owner, issuer, metadata_uri, issued_at, status, revoked_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(token_id_column(record.token_id)?)
    .bind(record.owner.as_str())
    .bind(record.issuer.as_str())
    .bind(record.metadata_uri.as_str())
    .bind(*record.issued_at.as_datetime())
    .bind(record.status.as_str())
    .bind(record.revoked_at.map(|t| *t.as_datetime()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist the status and revocation time of an existing certificate.
pub async fn update_status(pool: &PgPool, record: &Certificate) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE certificates SET status = $1, revoked_at = $2 WHERE token_id = $3",
    )
    .bind(record.status.as_str())
    .bind(record.revoked_at.map(|t| *t.as_datetime()))
    .bind(token_id_column(record.token_id)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load every certificate in token order for registry hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Certificate>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CertificateRow>(
        "SELECT token_id, owner, issuer, metadata_uri, issued_at, status, revoked_at
         FROM certificates ORDER BY token_id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CertificateRow::into_record).collect()
}

fn token_id_column(token_id: TokenId) -> Result<i64, sqlx::Error> {
    i64::try_from(token_id.value())
        .map_err(|_| sqlx::Error::Protocol(format!("token id {token_id} exceeds BIGINT")))
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CertificateRow {
    token_id: i64,
    owner: String,
    issuer: String,
    metadata_uri: String,
    issued_at: DateTime<Utc>,
    status: String,
    revoked_at: Option<DateTime<Utc>>,
}

impl CertificateRow {
    fn into_record(self) -> Result<Certificate, sqlx::Error> {
        let invalid = |field: &str, e: &dyn std::fmt::Display| {
            sqlx::Error::Protocol(format!(
                "invalid {field} in certificate row {}: {e}",
                self.token_id
            ))
        };

        let token_id = u64::try_from(self.token_id)
            .map_err(|e| invalid("token_id", &e))
            .and_then(|v| TokenId::new(v).map_err(|e| invalid("token_id", &e)))?;
        let status = match self.status.as_str() {
            "valid" => CertificateStatus::Valid,
            "revoked" => CertificateStatus::Revoked,
            other => return Err(invalid("status", &other)),
        };

        Ok(Certificate {
            token_id,
            owner: WalletAddress::new(&self.owner).map_err(|e| invalid("owner", &e))?,
            issuer: WalletAddress::new(&self.issuer).map_err(|e| invalid("issuer", &e))?,
            metadata_uri: MetadataUri::new(self.metadata_uri.as_str())
                .map_err(|e| invalid("metadata_uri", &e))?,
            issued_at: Timestamp::from_utc(self.issued_at),
            status,
            revoked_at: self.revoked_at.map(Timestamp::from_utc),
        })
    }
}
