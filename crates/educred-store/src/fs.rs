//! # Filesystem Metadata Store
//!
//! Objects live at `{root}/{id}`. The filename is the identifier, so the
//! layout is self-describing and a directory can be audited by rehashing
//! each file.
//!
//! Writes go to a temporary file in the same directory and are linked into
//! place with no-clobber semantics: concurrent writers of the same object
//! race harmlessly, and readers never observe a partially written file.

use std::fs;
use std::path::{Path, PathBuf};

use educred_core::ContentId;
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::store::{MetadataStore, StoreConfig};

/// A metadata store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsMetadataStore {
    root: PathBuf,
    config: StoreConfig,
}

impl FsMetadataStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, config: StoreConfig) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ContentId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

impl MetadataStore for FsMetadataStore {
    fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        if path.exists() {
            return Ok(false);
        }
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            use std::io::Write;
            tmp.write_all(bytes)?;
            tmp.as_file().sync_all()?;
        }
        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(true),
            // Content-addressed: an existing file under this name holds the same bytes.
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(StoreError::Io(e.error)),
        }
    }

    fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, id: &ContentId) -> Result<bool, StoreError> {
        Ok(self.path_for(id).is_file())
    }
}
