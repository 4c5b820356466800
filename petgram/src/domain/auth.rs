//! Authentication primitives such as login credentials.
//!
//! Keep raw input parsing at the edge by exposing constructors that
//! validate strings before a service talks to the authentication provider.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Requested username was blank once trimmed.
    EmptyUsername,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated email/password pair.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use petgram::domain::Credentials;
///
/// let creds = Credentials::try_from_parts(" ada@example.test ", "hunter2").unwrap();
/// assert_eq!(creds.email(), "ada@example.test");
/// assert_eq!(creds.password(), "hunter2");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the login identifier.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up request: credentials plus the username to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    credentials: Credentials,
    username: String,
}

impl SignUpRequest {
    /// Validate raw sign-up inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let credentials = Credentials::try_from_parts(email, password)?;
        let username = username.trim();
        if username.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        Ok(Self {
            credentials,
            username: username.to_owned(),
        })
    }

    /// Credentials for the new identity.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Username to store on the profile record.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}
