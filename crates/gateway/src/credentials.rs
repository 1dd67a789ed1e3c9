//! Bearer-credential storage.
//!
//! The gateway reads the credential from the store on **every**
//! authenticated call rather than caching it, so a rotation mid-session
//! takes effect on the next request. The gateway never writes the
//! store.

use std::sync::RwLock;

/// Read access to the persisted bearer credential.
pub trait CredentialStore: Send + Sync {
    /// The current bearer token, if a session exists.
    fn bearer_token(&self) -> Option<String>;
}

/// In-memory credential store standing in for persistent client
/// storage. Supports external rotation via [`set`](Self::set).
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    /// Replace the stored credential (e.g. after a token refresh).
    pub fn set(&self, token: Option<String>) {
        // A poisoned lock only means a writer panicked mid-swap; the
        // stored Option is still valid either way.
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn bearer_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_visible_on_next_read() {
        let store = MemoryCredentialStore::new(Some("tok-1".into()));
        assert_eq!(store.bearer_token().as_deref(), Some("tok-1"));

        store.set(Some("tok-2".into()));
        assert_eq!(store.bearer_token().as_deref(), Some("tok-2"));

        store.set(None);
        assert_eq!(store.bearer_token(), None);
    }
}
