//! User data model.
//!
//! A [`User`] joins the authentication provider's identity with the profile
//! record kept in the document store. Identity ids are opaque strings issued
//! by the provider and never reassigned.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Fallback username for identities with neither a profile nor a display name.
pub const DEFAULT_USERNAME: &str = "User";

const AVATAR_BASE_URL: &str = "https://picsum.photos/seed/";
const AVATAR_SIZE: &str = "48";

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable identity key issued by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Application user: identity plus profile fields.
///
/// ## Invariants
/// - `id` is the provider-issued identity key.
/// - `username` and `avatar` come from the stored profile record when one
///   exists, otherwise from provider defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: String,
    username: String,
    avatar: String,
}

impl User {
    /// Assemble a user from already-resolved parts.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        username: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            username: username.into(),
            avatar: avatar.into(),
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Email reported by the provider, or empty when it has none.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Name shown next to posts and comments.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Avatar image URL.
    pub fn avatar(&self) -> &str {
        self.avatar.as_str()
    }
}

/// Deterministic placeholder avatar keyed by `seed`.
///
/// The seed is percent-encoded as a single path segment, so usernames with
/// spaces or slashes still produce a well-formed URL.
///
/// # Examples
/// ```
/// use petgram::domain::seeded_avatar_url;
///
/// assert_eq!(
///     seeded_avatar_url("Rex"),
///     "https://picsum.photos/seed/Rex/48/48"
/// );
/// ```
pub fn seeded_avatar_url(seed: &str) -> String {
    let fallback = || format!("{AVATAR_BASE_URL}{seed}/{AVATAR_SIZE}/{AVATAR_SIZE}");
    let Ok(mut url) = Url::parse(AVATAR_BASE_URL) else {
        return fallback();
    };
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments
                .pop_if_empty()
                .push(seed)
                .push(AVATAR_SIZE)
                .push(AVATAR_SIZE);
        }
        Err(()) => return fallback(),
    }
    url.into()
}
