//! In-memory authentication provider.
//!
//! Accounts live in a map keyed by normalised email. The current session is
//! held in a `watch` channel so subscribers observe every transition.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthFailureCode, AuthIdentity, AuthProvider, AuthProviderError};
use crate::domain::{Credentials, UserId};

const MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    identity: AuthIdentity,
    password: Zeroizing<String>,
}

/// Authentication provider backed by a process-local account table.
pub struct InMemoryAuthProvider {
    accounts: Mutex<HashMap<String, Account>>,
    session: watch::Sender<Option<AuthIdentity>>,
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session,
        }
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.lock_accounts().map(|accounts| accounts.len()).unwrap_or(0)
    }

    fn lock_accounts(&self) -> Result<MutexGuard<'_, HashMap<String, Account>>, AuthProviderError> {
        self.accounts.lock().map_err(|_| {
            AuthProviderError::new(
                AuthFailureCode::Other("auth/internal-error".to_owned()),
                "account table lock poisoned",
            )
        })
    }

    fn start_session(&self, identity: AuthIdentity) {
        self.session.send_replace(Some(identity));
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn create_identity(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthIdentity, AuthProviderError> {
        if credentials.password().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthProviderError::from_provider_code(
                "auth/weak-password",
                "Password should be at least 6 characters.",
            ));
        }

        let identity = {
            let mut accounts = self.lock_accounts()?;
            let key = account_key(credentials.email());
            if accounts.contains_key(&key) {
                return Err(AuthProviderError::email_already_in_use(
                    "The email address is already in use by another account.",
                ));
            }
            let uid = UserId::new(Uuid::new_v4().to_string()).map_err(|err| {
                AuthProviderError::from_provider_code("auth/internal-error", err.to_string())
            })?;
            let identity = AuthIdentity::new(uid, Some(credentials.email().trim().to_owned()));
            accounts.insert(
                key,
                Account {
                    identity: identity.clone(),
                    password: Zeroizing::new(credentials.password().to_owned()),
                },
            );
            identity
        };

        self.start_session(identity.clone());
        Ok(identity)
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthIdentity, AuthProviderError> {
        let identity = {
            let accounts = self.lock_accounts()?;
            let account = accounts
                .get(&account_key(credentials.email()))
                .ok_or_else(|| AuthProviderError::invalid_credential("INVALID_LOGIN_CREDENTIALS"))?;
            if account.password.as_str() != credentials.password() {
                return Err(AuthProviderError::invalid_credential("INVALID_LOGIN_CREDENTIALS"));
            }
            account.identity.clone()
        };

        self.start_session(identity.clone());
        Ok(identity)
    }

    async fn terminate_session(&self) -> Result<(), AuthProviderError> {
        self.session.send_if_modified(|current| current.take().is_some());
        Ok(())
    }

    async fn update_display_name(
        &self,
        uid: &UserId,
        display_name: &str,
    ) -> Result<AuthIdentity, AuthProviderError> {
        let updated = {
            let mut accounts = self.lock_accounts()?;
            let account = accounts
                .values_mut()
                .find(|account| &account.identity.uid == uid)
                .ok_or_else(|| {
                    AuthProviderError::from_provider_code("auth/user-not-found", "no such user")
                })?;
            account.identity.display_name = Some(display_name.to_owned());
            account.identity.clone()
        };

        // Profile edits are not session transitions, so subscribers are not woken.
        self.session.send_if_modified(|current| {
            if let Some(identity) = current.as_mut().filter(|identity| &identity.uid == uid) {
                identity.display_name = updated.display_name.clone();
            }
            false
        });
        Ok(updated)
    }

    fn current_identity(&self) -> Option<AuthIdentity> {
        self.session.borrow().clone()
    }

    fn session_changes(&self) -> watch::Receiver<Option<AuthIdentity>> {
        self.session.subscribe()
    }
}
