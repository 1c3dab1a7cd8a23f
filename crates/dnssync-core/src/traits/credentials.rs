// # Credential Source Trait
//
// Narrow secret-acquisition seam for collaborators that authenticate
// with a username/secret pair. Keeping acquisition behind this trait
// lets a future secret-store backend replace the key file without
// touching reconciliation or transport code.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// A username/secret pair
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Errors from credential acquisition
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The backing store could not be read
    #[error("failed to read credentials: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store was readable but incomplete
    #[error("credentials incomplete: {0}")]
    Incomplete(String),
}

/// Trait for credential source implementations
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Acquire the username/secret pair
    async fn credential(&self) -> Result<Credential, CredentialError>;
}

/// Key-file credential source
///
/// Reads a two-line plaintext file:
///
/// ```text
/// username:<value>
/// password:<value>
/// ```
///
/// The file is expected to be owner read/write only; the interactive
/// setup flow creates it with mode 600.
#[derive(Debug, Clone)]
pub struct KeyFileCredentials {
    path: PathBuf,
}

impl KeyFileCredentials {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CredentialSource for KeyFileCredentials {
    async fn credential(&self) -> Result<Credential, CredentialError> {
        let content = fs::read_to_string(&self.path).await?;

        let mut username = None;
        let mut password = None;
        for line in content.lines() {
            if let Some(value) = line.strip_prefix("username:") {
                username = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("password:") {
                password = Some(value.trim().to_string());
            }
        }

        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Credential { username, password })
            }
            _ => Err(CredentialError::Incomplete(format!(
                "{} is missing a username or password line",
                self.path.display()
            ))),
        }
    }
}
