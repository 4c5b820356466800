//! Error types for the example-data crate.
//!
//! Fixture documents are validated eagerly so a broken fixture file is
//! reported once at load time rather than as a half-seeded store.

use thiserror::Error;

/// Errors that can occur when parsing or validating a fixture set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// The fixture JSON is malformed or missing required fields.
    #[error("invalid fixture JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The fixture document version is not supported.
    #[error("unsupported fixture version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the document.
        actual: u32,
    },

    /// The fixture document contains no posts.
    #[error("fixture set contains no posts")]
    EmptyPosts,

    /// A post has a blank identifier.
    #[error("fixture post at index {index} has an empty id")]
    EmptyPostId {
        /// Index of the offending post.
        index: usize,
    },

    /// Two posts share an identifier.
    #[error("fixture post id '{id}' appears more than once")]
    DuplicatePostId {
        /// The repeated identifier.
        id: String,
    },

    /// Two comments on the same post share an identifier.
    #[error("fixture post '{post_id}' repeats comment id '{comment_id}'")]
    DuplicateCommentId {
        /// Post containing the repeated comment id.
        post_id: String,
        /// The repeated comment identifier.
        comment_id: String,
    },
}
