//! Port abstraction for the external authentication provider.
//!
//! The provider owns identities, passwords and the "current session". It
//! knows nothing about profile records; the session service layers those on
//! top by reading the document store.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{Credentials, UserId};

/// Provider failure codes the domain reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailureCode {
    /// `auth/email-already-in-use`
    EmailAlreadyInUse,
    /// `auth/invalid-credential`
    InvalidCredential,
    /// `auth/user-not-found`
    UserNotFound,
    /// `auth/wrong-password`
    WrongPassword,
    /// Any other provider code, kept verbatim.
    Other(String),
}

impl AuthFailureCode {
    /// Whether the code means the email/password pair did not match.
    pub fn is_credential_mismatch(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredential | Self::UserNotFound | Self::WrongPassword
        )
    }

    /// Provider wire form of the code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::Other(code) => code.as_str(),
        }
    }
}

impl FromStr for AuthFailureCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl fmt::Display for AuthFailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by authentication provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("authentication provider error ({code}): {message}")]
pub struct AuthProviderError {
    code: AuthFailureCode,
    message: String,
}

impl AuthProviderError {
    /// Build an error from a parsed code.
    pub fn new(code: AuthFailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build an error from the provider's textual code.
    pub fn from_provider_code(code: &str, message: impl Into<String>) -> Self {
        let parsed = match code.parse::<AuthFailureCode>() {
            Ok(parsed) => parsed,
            Err(never) => match never {},
        };
        Self::new(parsed, message)
    }

    /// Shorthand for [`AuthFailureCode::EmailAlreadyInUse`].
    pub fn email_already_in_use(message: impl Into<String>) -> Self {
        Self::new(AuthFailureCode::EmailAlreadyInUse, message)
    }

    /// Shorthand for [`AuthFailureCode::InvalidCredential`].
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::new(AuthFailureCode::InvalidCredential, message)
    }

    /// Failure code.
    pub fn code(&self) -> &AuthFailureCode {
        &self.code
    }

    /// Provider-supplied message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Identity as the provider knows it, before profile hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Stable provider-assigned identifier.
    pub uid: UserId,
    /// Registered email, when the provider exposes one.
    pub email: Option<String>,
    /// Display name stored on the provider identity.
    pub display_name: Option<String>,
    /// Photo URL stored on the provider identity.
    pub photo_url: Option<String>,
}

impl AuthIdentity {
    /// Identity with only a uid and optional email.
    pub fn new(uid: UserId, email: Option<String>) -> Self {
        Self {
            uid,
            email,
            display_name: None,
            photo_url: None,
        }
    }
}

/// External authentication provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new identity and make it the current session.
    async fn create_identity(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthIdentity, AuthProviderError>;

    /// Sign in with existing credentials and make it the current session.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthIdentity, AuthProviderError>;

    /// End the current session. A no-op when nobody is signed in.
    async fn terminate_session(&self) -> Result<(), AuthProviderError>;

    /// Set the provider-side display name of `uid`.
    async fn update_display_name(
        &self,
        uid: &UserId,
        display_name: &str,
    ) -> Result<AuthIdentity, AuthProviderError>;

    /// Identity of the current session, if any.
    fn current_identity(&self) -> Option<AuthIdentity>;

    /// Receiver that observes every session change.
    ///
    /// The receiver starts out holding the current value, so a subscriber
    /// sees the present state before any later transition.
    fn session_changes(&self) -> watch::Receiver<Option<AuthIdentity>>;
}
