//! Keychain-backed session persistence for the CLI.
//!
//! Each profile gets its own keychain entry holding the serialized session.
//! Test builds swap the OS keychain for a process-wide map.

use muse_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence, SupabaseAuthClient};
use muse_core::config::SupabaseConfig;

/// Session storage in the platform credential store (macOS Keychain, Windows
/// Credential Manager, Linux kernel keyutils).
///
/// Every instance for the same profile addresses the same entry, so a session
/// saved by one command is visible to the next.
#[derive(Debug, Clone)]
pub struct KeychainSessionStore {
    account: String,
}

impl KeychainSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            account: format!("supabase_session:{profile_name}"),
        }
    }
}

impl SessionPersistence for KeychainSessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        secret::read(&self.account)?
            .map(|raw| serde_json::from_str(&raw).map_err(AuthError::from))
            .transpose()
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        secret::write(&self.account, &serde_json::to_string(session)?)
    }

    fn clear_session(&self) -> AuthResult<()> {
        secret::delete(&self.account)
    }
}

fn storage_error(error: impl std::fmt::Display) -> AuthError {
    AuthError::SecureStorage(error.to_string())
}

#[cfg(not(test))]
mod secret {
    use keyring::Entry;
    use muse_core::auth::AuthResult;

    use super::storage_error;

    const SERVICE: &str = "muse-cli";

    fn entry(account: &str) -> AuthResult<Entry> {
        Entry::new(SERVICE, account).map_err(storage_error)
    }

    pub fn read(account: &str) -> AuthResult<Option<String>> {
        match entry(account)?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    pub fn write(account: &str, raw: &str) -> AuthResult<()> {
        entry(account)?.set_password(raw).map_err(storage_error)
    }

    pub fn delete(account: &str) -> AuthResult<()> {
        match entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }
}


pub type CliAuthClient = SupabaseAuthClient<KeychainSessionStore>;

pub fn auth_client(profile_name: &str, config: &SupabaseConfig) -> AuthResult<CliAuthClient> {
    SupabaseAuthClient::new(config, KeychainSessionStore::new(profile_name))
}
