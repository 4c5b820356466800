//! Resolved post seed types.
//!
//! These are the records handed to callers once relative timestamps have
//! been fixed to an instant. They mirror the application's post shape
//! without depending on it, and are converted into domain posts at the
//! point of use.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A demonstration post ready to be written to a store.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use example_data::ExamplePostSeed;
///
/// let post = ExamplePostSeed {
///     id: "post_x".to_owned(),
///     user_id: "u1".to_owned(),
///     username: "Ada".to_owned(),
///     user_avatar: "https://example.test/a.png".to_owned(),
///     image_url: "https://example.test/a.jpg".to_owned(),
///     caption: "hi".to_owned(),
///     hashtags: vec![],
///     likes: vec![],
///     comments: vec![],
///     category: "dog".to_owned(),
///     timestamp: Utc::now(),
///     filter: "none".to_owned(),
/// };
///
/// assert_eq!(post.category, "dog");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplePostSeed {
    /// Store key for the post.
    pub id: String,
    /// Author identifier.
    pub user_id: String,
    /// Author display name snapshot.
    pub username: String,
    /// Author avatar URL snapshot.
    pub user_avatar: String,
    /// Image location.
    pub image_url: String,
    /// Caption text.
    pub caption: String,
    /// Hashtags carried by the fixture.
    pub hashtags: Vec<String>,
    /// Identifiers of users who liked the post.
    pub likes: Vec<String>,
    /// Comments in display order.
    pub comments: Vec<ExampleCommentSeed>,
    /// Lowercase category name.
    pub category: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    /// Image filter expression.
    pub filter: String,
}

/// A demonstration comment with an absolute timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCommentSeed {
    /// Identifier unique within the parent post.
    pub id: String,
    /// Author identifier.
    pub user_id: String,
    /// Author display name snapshot.
    pub username: String,
    /// Comment body.
    pub text: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
}
