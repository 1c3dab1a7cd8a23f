// # File State Store
//
// Single-line file holding the last successfully applied address.
//
// ## Format
//
// The file contains exactly one line: the dotted-quad address most
// recently confirmed at the provider. Overwrite semantics; no history.
//
// ## Durability
//
// Writes go to a temporary sibling first and are renamed into place, so
// a crash mid-write can never leave a truncated state file behind. The
// file is opened and released per access; no long-held locks. A single
// writer is assumed (the external timer prevents overlapping runs).

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::traits::state_store::{StateError, StateStore};

/// File-backed last-applied-address store
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn read_last(&self) -> Result<Option<Ipv4Addr>, StateError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                let trimmed = content.trim();
                match trimmed.parse::<Ipv4Addr>() {
                    Ok(ip) => Ok(Some(ip)),
                    Err(_) => {
                        tracing::warn!(
                            "state file {} does not contain an address: {:?}",
                            self.path.display(),
                            trimmed
                        );
                        Ok(None)
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_last(&self, ip: Ipv4Addr) -> Result<(), StateError> {
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(ip.to_string().as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await?;
        }
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}
