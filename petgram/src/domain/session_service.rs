//! Authentication session management.
//!
//! Wraps the authentication provider, translating raw identities into
//! hydrated [`User`] values backed by a profile record in the document
//! store. A profile is created the first time an identity is seen without
//! one.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    AuthFailureCode, AuthIdentity, AuthProvider, AuthProviderError, DocumentPath, DocumentStore,
};
use crate::domain::records::ProfileRecord;
use crate::domain::store_errors::{map_store_read_error, map_store_write_error};
use crate::domain::{
    Credentials, DEFAULT_USERNAME, Error, ErrorCode, SignUpRequest, User, UserId,
    seeded_avatar_url,
};

const DUPLICATE_ACCOUNT_MESSAGE: &str = "User with this email already exists.";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
const SIGN_UP_FALLBACK: &str = "Failed to sign up.";
const LOG_IN_FALLBACK: &str = "Failed to log in.";
const LOG_OUT_FALLBACK: &str = "Failed to log out.";

/// Session service built on an [`AuthProvider`] and a [`DocumentStore`].
pub struct SessionService<A, S> {
    auth: Arc<A>,
    store: Arc<S>,
}

impl<A, S> Clone for SessionService<A, S> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            store: Arc::clone(&self.store),
        }
    }
}

impl<A, S> SessionService<A, S> {
    /// Create a new service over the given adapters.
    pub fn new(auth: Arc<A>, store: Arc<S>) -> Self {
        Self { auth, store }
    }
}

impl<A, S> SessionService<A, S>
where
    A: AuthProvider + 'static,
    S: DocumentStore + 'static,
{
    /// Register a new account and return its hydrated user.
    ///
    /// The provider identity is created first, then its display name is
    /// set and a profile record with a username-seeded avatar is written.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<User, Error> {
        let identity = self
            .auth
            .create_identity(request.credentials())
            .await
            .map_err(map_sign_up_error)?;
        let identity = self
            .auth
            .update_display_name(&identity.uid, request.username())
            .await
            .map_err(map_sign_up_error)?;

        let profile = ProfileRecord::new(request.username(), seeded_avatar_url(request.username()));
        self.write_profile(&identity.uid, &profile).await?;
        info!(user_id = %identity.uid, "account created");

        self.hydrate(&identity).await
    }

    /// Sign in with existing credentials.
    ///
    /// Unknown accounts and wrong passwords are reported identically.
    pub async fn log_in(&self, credentials: &Credentials) -> Result<User, Error> {
        let identity = self
            .auth
            .authenticate(credentials)
            .await
            .map_err(map_log_in_error)?;
        self.hydrate(&identity).await
    }

    /// End the current session.
    pub async fn log_out(&self) -> Result<(), Error> {
        self.auth
            .terminate_session()
            .await
            .map_err(|err| map_auth_error(err, LOG_OUT_FALLBACK))
    }

    /// Hydrated user for the provider's current session.
    pub async fn current_user(&self) -> Result<User, Error> {
        let Some(identity) = self.auth.current_identity() else {
            return Err(Error::unauthenticated("User not authenticated"));
        };
        self.hydrate(&identity).await
    }

    /// Resolve `identity` into a [`User`], creating its profile if missing.
    ///
    /// Stored profile fields win over provider fields. Missing values fall
    /// back to the provider display name or photo, then to `"User"` and an
    /// avatar seeded by the identity's id.
    ///
    /// The default profile is written with a plain overwrite. On a
    /// multi-threaded runtime a subscriber hydrating a fresh sign-up can
    /// read before [`Self::sign_up`] writes its profile and overwrite it
    /// afterwards with the defaults.
    pub async fn hydrate(&self, identity: &AuthIdentity) -> Result<User, Error> {
        let path = profile_path(&identity.uid)?;
        let stored = self
            .store
            .read(&path)
            .await
            .map_err(|err| map_store_read_error(&path, err))?;

        let email = identity.email.clone().unwrap_or_default();
        let provider_name = non_blank(identity.display_name.as_deref());
        let provider_photo = non_blank(identity.photo_url.as_deref());

        let Some(value) = stored.filter(|value| !value.is_null()) else {
            let username = provider_name.unwrap_or(DEFAULT_USERNAME).to_owned();
            let avatar = provider_photo
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| seeded_avatar_url(identity.uid.as_ref()));
            let profile = ProfileRecord::new(username.as_str(), avatar.as_str());
            self.write_profile(&identity.uid, &profile).await?;
            info!(user_id = %identity.uid, "created default profile");
            return Ok(User::new(identity.uid.clone(), email, username, avatar));
        };

        let profile = match serde_json::from_value::<ProfileRecord>(value) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user_id = %identity.uid, error = %err, "ignoring malformed profile record");
                ProfileRecord::default()
            }
        };
        let username = profile
            .username()
            .or(provider_name)
            .unwrap_or(DEFAULT_USERNAME)
            .to_owned();
        let avatar = profile
            .avatar()
            .or(provider_photo)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| seeded_avatar_url(identity.uid.as_ref()));
        Ok(User::new(identity.uid.clone(), email, username, avatar))
    }

    /// Observe session changes.
    ///
    /// `callback` runs once with the current state, then after every
    /// sign-in or sign-out, always with a hydrated user or `None`.
    /// Invocations for one subscription never overlap. Identities that
    /// fail to hydrate are logged and skipped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe_to_session<F>(&self, mut callback: F) -> SessionSubscription
    where
        F: FnMut(Option<User>) + Send + 'static,
    {
        let mut changes = self.auth.session_changes();
        let service = self.clone();
        let task = tokio::spawn(async move {
            loop {
                let identity = changes.borrow_and_update().clone();
                match identity {
                    None => callback(None),
                    Some(identity) => match service.hydrate(&identity).await {
                        Ok(user) => callback(Some(user)),
                        Err(err) => {
                            error!(user_id = %identity.uid, error = %err, "session hydration failed");
                        }
                    },
                }
                if changes.changed().await.is_err() {
                    debug!("authentication provider closed its session channel");
                    break;
                }
            }
        });
        SessionSubscription {
            handle: task.abort_handle(),
        }
    }

    /// Subscribe and forward every session event into a channel.
    pub fn session_events(&self) -> (SessionSubscription, mpsc::UnboundedReceiver<Option<User>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe_to_session(move |user| {
            if tx.send(user).is_err() {
                debug!("session event receiver dropped");
            }
        });
        (subscription, rx)
    }

    async fn write_profile(&self, uid: &UserId, profile: &ProfileRecord) -> Result<(), Error> {
        let path = profile_path(uid)?;
        let value = serde_json::to_value(profile)
            .map_err(|err| Error::internal(format!("failed to encode profile: {err}")))?;
        self.store
            .write(&path, value)
            .await
            .map_err(|err| map_store_write_error(&path, err))
    }
}

/// Handle returned by [`SessionService::subscribe_to_session`].
///
/// Dropping the handle also unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    handle: AbortHandle,
}

impl SessionSubscription {
    /// Stop delivering events. Safe to call more than once.
    pub fn unsubscribe(&self) {
        self.handle.abort();
    }

    /// Whether the subscription task is still running.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn profile_path(uid: &UserId) -> Result<DocumentPath, Error> {
    DocumentPath::users()
        .child(uid.as_ref())
        .map_err(|err| Error::internal(format!("user id cannot address a profile: {err}")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn map_auth_error(err: AuthProviderError, fallback: &str) -> Error {
    Error::with_fallback(ErrorCode::AuthFailed, err.message(), fallback)
}

fn map_sign_up_error(err: AuthProviderError) -> Error {
    if *err.code() == AuthFailureCode::EmailAlreadyInUse {
        return Error::duplicate_account(DUPLICATE_ACCOUNT_MESSAGE);
    }
    map_auth_error(err, SIGN_UP_FALLBACK)
}

fn map_log_in_error(err: AuthProviderError) -> Error {
    if err.code().is_credential_mismatch() {
        return Error::invalid_credentials(INVALID_CREDENTIALS_MESSAGE);
    }
    map_auth_error(err, LOG_IN_FALLBACK)
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
