//! # Application State
//!
//! Shared state for the Axum application: the metadata store, the
//! certificate registry, the optional database pool and configuration.
//!
//! The in-memory registry serves reads. When a pool is present, a mint or
//! revocation is written to Postgres first and committed in memory only
//! once the row is stored; a failed write is returned to the caller and
//! leaves the registry unchanged. [`AppState::hydrate_from_db`] rebuilds the
//! registry on startup, so nothing acknowledged is lost or reissued.

use std::path::PathBuf;
use std::sync::Arc;

use educred_core::{MetadataUri, TokenId, WalletAddress};
use educred_issuance::{IssuanceConfig, Issuer};
use educred_registry::{Caller, Certificate, CertificateRegistry, Revocation};
use educred_store::{
    FsMetadataStore, MemoryMetadataStore, MetadataStore, StoreConfig, StoreError, StoredObject,
    DEFAULT_GATEWAY, DEFAULT_MAX_BYTES,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use crate::backend::ApiBackend;
use crate::error::AppError;

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token`.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Largest accepted metadata payload in bytes.
    pub max_upload_bytes: usize,
    /// Prefix for metadata retrieval URLs.
    pub gateway: String,
    /// Directory for the filesystem store. In-memory when `None`.
    pub store_dir: Option<PathBuf>,
    /// Requests per caller per minute.
    pub rate_limit_per_minute: u64,
    pub issuance: IssuanceConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("gateway", &self.gateway)
            .field("store_dir", &self.store_dir)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("issuance", &self.issuance)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            max_upload_bytes: DEFAULT_MAX_BYTES,
            gateway: DEFAULT_GATEWAY.to_string(),
            store_dir: None,
            rate_limit_per_minute: 1000,
            issuance: IssuanceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `AUTH_TOKEN` (unset disables auth)
    /// - `EDUCRED_MAX_UPLOAD_BYTES` (default: 10 MiB)
    /// - `EDUCRED_GATEWAY` (default: `ipfs://`)
    /// - `EDUCRED_STORE_DIR` (unset keeps metadata in memory)
    /// - `EDUCRED_RATE_LIMIT` (default: 1000 per minute)
    /// - the `EDUCRED_CALL_TIMEOUT_MS` family read by [`IssuanceConfig::from_env`]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            auth_token: std::env::var("AUTH_TOKEN").ok().filter(|t| !t.is_empty()),
            max_upload_bytes: env_parse("EDUCRED_MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
            gateway: std::env::var("EDUCRED_GATEWAY").unwrap_or(defaults.gateway),
            store_dir: std::env::var("EDUCRED_STORE_DIR").ok().map(PathBuf::from),
            rate_limit_per_minute: env_parse("EDUCRED_RATE_LIMIT")
                .unwrap_or(defaults.rate_limit_per_minute),
            issuance: IssuanceConfig::from_env(),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_bytes: self.max_upload_bytes,
            gateway: self.gateway.clone(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

/// Shared application state accessible to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<dyn MetadataStore>,
    pub registry: CertificateRegistry,
    /// When `Some`, registry writes are persisted to Postgres.
    pub db_pool: Option<PgPool>,
    /// Renders `/metrics`. `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
    pub config: AppConfig,
    /// Serializes prepare, persist and commit of registry writes.
    write_gate: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// In-memory state with default configuration.
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemoryMetadataStore::new(config.store_config()));
        Self::with_store(config, store, None)
    }

    /// Build state from configuration, opening the filesystem store when
    /// `store_dir` is set.
    pub fn try_with_config(config: AppConfig, db_pool: Option<PgPool>) -> Result<Self, StoreError> {
        let store: Arc<dyn MetadataStore> = match &config.store_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "using filesystem metadata store");
                Arc::new(FsMetadataStore::open(dir, config.store_config())?)
            }
            None => {
                tracing::warn!("EDUCRED_STORE_DIR not set; metadata is kept in memory");
                Arc::new(MemoryMetadataStore::new(config.store_config()))
            }
        };
        Ok(Self::with_store(config, store, db_pool))
    }

    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn MetadataStore>,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            store,
            registry: CertificateRegistry::new(),
            db_pool,
            metrics: None,
            config,
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Issuance workflow acting as `caller`.
    pub fn issuer(&self, caller: Caller) -> Issuer<ApiBackend> {
        Issuer::new(
            ApiBackend::new(self.clone(), caller),
            self.config.issuance.clone(),
        )
    }

    pub fn store_document(&self, document: &serde_json::Value) -> Result<StoredObject, AppError> {
        let stored = self.store.store_document(document)?;
        metrics::counter!("educred_metadata_bytes_stored_total").increment(stored.size as u64);
        Ok(stored)
    }

    pub fn store_file(&self, bytes: &[u8]) -> Result<StoredObject, AppError> {
        let stored = self.store.store_file(bytes)?;
        metrics::counter!("educred_metadata_bytes_stored_total").increment(stored.size as u64);
        Ok(stored)
    }

    /// Mint a certificate. With a database, the row is stored before the
    /// mint is committed.
    pub async fn mint(
        &self,
        caller: &Caller,
        owner: WalletAddress,
        metadata_uri: MetadataUri,
    ) -> Result<Certificate, AppError> {
        let certificate = match &self.db_pool {
            None => self.registry.mint(caller, owner, metadata_uri)?,
            Some(pool) => {
                let _gate = self.write_gate.lock().await;
                let draft = self.registry.prepare_mint(caller, owner, metadata_uri)?;
                if let Err(e) = crate::db::certificates::insert(pool, &draft).await {
                    tracing::error!(token_id = %draft.token_id, error = %e, "failed to persist certificate");
                    return Err(AppError::Internal(format!(
                        "failed to persist certificate {}: {e}",
                        draft.token_id
                    )));
                }
                self.registry.commit_mint(draft)?
            }
        };
        metrics::counter!("educred_certificates_minted_total").increment(1);
        Ok(certificate)
    }

    /// Revoke a certificate. Only a first revoke touches the database, and
    /// it is committed in memory only after the row is updated.
    pub async fn revoke(&self, caller: &Caller, token_id: TokenId) -> Result<Revocation, AppError> {
        let revocation = match &self.db_pool {
            None => self.registry.revoke(caller, token_id)?,
            Some(pool) => {
                let _gate = self.write_gate.lock().await;
                let draft = self.registry.prepare_revoke(caller, token_id)?;
                if !draft.newly_revoked {
                    return Ok(draft);
                }
                match crate::db::certificates::update_status(pool, &draft.certificate).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::error!(token_id = %token_id, "revoked certificate has no stored row");
                        return Err(AppError::Internal(format!(
                            "certificate {token_id} has no stored row"
                        )));
                    }
                    Err(e) => {
                        tracing::error!(token_id = %token_id, error = %e, "failed to persist revocation");
                        return Err(AppError::Internal(format!(
                            "failed to persist revocation of {token_id}: {e}"
                        )));
                    }
                }
                self.registry.commit_revoke(caller, &draft.certificate)?
            }
        };
        if revocation.newly_revoked {
            metrics::counter!("educred_certificates_revoked_total").increment(1);
        }
        Ok(revocation)
    }

    /// Rebuild the registry from the database.
    ///
    /// No-op without a pool.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let records = crate::db::certificates::load_all(pool)
            .await
            .map_err(|e| format!("failed to load certificates: {e}"))?;
        let count = self
            .registry
            .restore(records)
            .map_err(|e| format!("failed to restore registry: {e}"))?;

        tracing::info!(certificates = count, "hydrated registry from database");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
