use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Result, SummarizerError};

/// Environment variable that takes precedence over the stored key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Storage for the completion-provider API key
pub trait CredentialStore: Send + Sync {
    fn save(&self, secret: &str) -> Result<()>;
    /// `None` when no key is stored
    fn load(&self) -> Result<Option<String>>;
    /// Remove the key; removing an absent key succeeds
    fn delete(&self) -> Result<()>;
}

/// Plaintext key file, readable only by the owner on Unix
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    honor_env: bool,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            honor_env: true,
        }
    }

    /// Ignore `OPENAI_API_KEY` and only read the file
    pub fn without_env(mut self) -> Self {
        self.honor_env = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn env_key(&self) -> Option<String> {
        if !self.honor_env {
            return None;
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, secret: &str) -> Result<()> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(SummarizerError::Credential(std::io::Error::new(
                ErrorKind::InvalidInput,
                "API key is empty",
            )));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(SummarizerError::Credential)?;
        }
        write_private(&self.path, secret).map_err(SummarizerError::Credential)?;

        info!("🔑 API key saved to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        if let Some(key) = self.env_key() {
            debug!("Using API key from {}", API_KEY_ENV);
            return Ok(Some(key));
        }

        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let key = content.trim();
                Ok((!key.is_empty()).then(|| key.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SummarizerError::Credential(e)),
        }
    }

    fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("🗑️ API key removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SummarizerError::Credential(e)),
        }
    }
}

/// Owner-only from creation; an existing file is narrowed before the secret lands
#[cfg(unix)]
fn write_private(path: &Path, secret: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(secret.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, secret: &str) -> std::io::Result<()> {
    std::fs::write(path, secret)
}

/// Key held for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    secret: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Mutex::new(Some(secret.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.secret.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, secret: &str) -> Result<()> {
        *self.slot() = Some(secret.trim().to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn delete(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
