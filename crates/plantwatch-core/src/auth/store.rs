use std::future::Future;

use tokio::sync::Mutex;
use tracing::debug;

use super::Credential;

/// Holds at most one credential for the relay.
///
/// Every refresh runs while the lock is held, so concurrent callers that find
/// the store empty wait for the first login instead of issuing their own.
#[derive(Debug, Default)]
pub struct CredentialStore {
    current: Mutex<Option<Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the cached credential, if any
    pub async fn current(&self) -> Option<Credential> {
        self.current.lock().await.clone()
    }

    /// Store a credential obtained elsewhere
    pub async fn replace(&self, credential: Credential) {
        *self.current.lock().await = Some(credential);
    }

    /// Drop the cached credential. Returns whether one was held.
    pub async fn clear(&self) -> bool {
        self.current.lock().await.take().is_some()
    }

    /// Return the cached credential, running `refresh` only when empty.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<Credential, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credential, E>>,
    {
        let mut current = self.current.lock().await;
        if let Some(ref credential) = *current {
            return Ok(credential.clone());
        }
        let credential = refresh().await?;
        *current = Some(credential.clone());
        Ok(credential)
    }

    /// Replace the cached credential with a fresh one.
    /// On failure the previously cached credential is kept.
    pub async fn refresh<F, Fut, E>(&self, refresh: F) -> Result<Credential, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credential, E>>,
    {
        let mut current = self.current.lock().await;
        let credential = refresh().await?;
        *current = Some(credential.clone());
        Ok(credential)
    }

    /// Replace `stale` after the server rejected it.
    ///
    /// If another task already swapped in a different credential, that one
    /// is returned and `refresh` is not called.
    pub async fn renew<F, Fut, E>(&self, stale: &Credential, refresh: F) -> Result<Credential, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credential, E>>,
    {
        let mut current = self.current.lock().await;
        if let Some(held) = current.as_ref() {
            if held != stale {
                debug!("Credential already renewed by another caller");
                return Ok(held.clone());
            }
        }
        *current = None;
        let credential = refresh().await?;
        *current = Some(credential.clone());
        Ok(credential)
    }
}
