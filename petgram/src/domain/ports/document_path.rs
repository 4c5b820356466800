//! Validated key paths into the tree-shaped document store.

use std::fmt;

/// Top-level collection holding posts keyed by id.
pub const POSTS_COLLECTION: &str = "posts";
/// Top-level collection holding profile records keyed by identity id.
pub const USERS_COLLECTION: &str = "users";

const FORBIDDEN_CHARACTERS: [char; 5] = ['.', '#', '$', '[', ']'];

/// Validation errors raised when constructing a [`DocumentPath`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentPathValidationError {
    /// The path has no segments.
    #[error("document path must not be empty")]
    Empty,
    /// A segment between separators is blank.
    #[error("document path '{path}' contains an empty segment")]
    EmptySegment { path: String },
    /// A segment uses a character the store reserves.
    #[error("document path segment '{segment}' contains a reserved character")]
    ReservedCharacter { segment: String },
}

/// Slash-separated path such as `posts/-NxA1` addressing one node.
///
/// ## Invariants
/// - At least one segment.
/// - No segment is empty or contains `.`, `#`, `$`, `[`, `]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Validate a raw path. Leading and trailing slashes are ignored.
    ///
    /// # Examples
    /// ```
    /// use petgram::domain::ports::DocumentPath;
    ///
    /// let path = DocumentPath::new("/posts/p1/").unwrap();
    /// assert_eq!(path.as_str(), "posts/p1");
    /// assert!(DocumentPath::new("posts/a.b").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DocumentPathValidationError> {
        let trimmed = raw.as_ref().trim_matches('/');
        if trimmed.is_empty() {
            return Err(DocumentPathValidationError::Empty);
        }
        for segment in trimmed.split('/') {
            validate_segment(segment, trimmed)?;
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The `posts` collection.
    pub fn posts() -> Self {
        Self(POSTS_COLLECTION.to_owned())
    }

    /// The `users` collection.
    pub fn users() -> Self {
        Self(USERS_COLLECTION.to_owned())
    }

    /// Extend the path by one segment.
    pub fn child(&self, segment: &str) -> Result<Self, DocumentPathValidationError> {
        if segment.contains('/') {
            return Err(DocumentPathValidationError::ReservedCharacter {
                segment: segment.to_owned(),
            });
        }
        let joined = format!("{}/{segment}", self.0);
        validate_segment(segment, &joined)?;
        Ok(Self(joined))
    }

    /// Path segments from the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Borrow the canonical string form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn validate_segment(segment: &str, path: &str) -> Result<(), DocumentPathValidationError> {
    if segment.trim().is_empty() {
        return Err(DocumentPathValidationError::EmptySegment {
            path: path.to_owned(),
        });
    }
    if segment.contains(FORBIDDEN_CHARACTERS) || segment.chars().any(char::is_control) {
        return Err(DocumentPathValidationError::ReservedCharacter {
            segment: segment.to_owned(),
        });
    }
    Ok(())
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for DocumentPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
