//! Filesystem Snapshot Store
//!
//! Local stand-in for blob storage. Each key maps to one file under the root
//! directory; writes go to a temporary sibling and are renamed into place.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use rand::Rng;
use tokio::fs;

use crate::domain::SnapshotKey;
use crate::ports::{SnapshotStore, StoreError, WriteReceipt};

#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a key is stored at. Keys must be a single path component.
    pub fn path_for(&self, key: &SnapshotKey) -> Result<PathBuf, StoreError> {
        let key_str = key.as_str();
        if key_str.is_empty()
            || key_str == "."
            || key_str == ".."
            || key_str.contains('/')
            || key_str.contains('\\')
        {
            return Err(StoreError::InvalidKey(key_str.to_string()));
        }
        Ok(self.root.join(key_str))
    }
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn write(&self, key: &SnapshotKey, bytes: Vec<u8>) -> Result<WriteReceipt, StoreError> {
        let target = self.path_for(key)?;
        fs::create_dir_all(&self.root).await?;

        let suffix: u32 = rand::thread_rng().gen();
        let temp = self.root.join(format!(".{}.tmp-{:08x}", key.as_str(), suffix));
        let len = bytes.len();

        let written = match fs::write(&temp, &bytes).await {
            Ok(()) => fs::rename(&temp, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(WriteReceipt::new(key.clone(), len))
    }

    fn location(&self) -> String {
        format!("file://{}", self.root.display())
    }
}
