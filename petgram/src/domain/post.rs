//! Post, comment, and category data model.
//!
//! Posts embed their comments by value and reference users by id only.
//! The author's `username`/`user_avatar` are a snapshot taken at creation
//! time and are never refreshed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Closed set of post categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dog,
    Cat,
    Bird,
    Other,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Self; 4] = [Self::Dog, Self::Cat, Self::Bird, Self::Other];

    /// Lowercase wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Bird => "bird",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category or filter name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct CategoryParseError(String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| CategoryParseError(raw.to_owned()))
    }
}

/// Feed projection selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Show every post.
    #[default]
    All,
    /// Show only posts of one category.
    Only(Category),
}

impl CategoryFilter {
    /// Whether `post` belongs in the filtered view.
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => post.category == *category,
        }
    }

    /// Project `posts` through the filter, preserving relative order.
    pub fn apply(&self, posts: &[Post]) -> Vec<Post> {
        posts
            .iter()
            .filter(|post| self.matches(post))
            .cloned()
            .collect()
    }
}

impl FromStr for CategoryFilter {
    type Err = CategoryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        raw.parse().map(Self::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

/// Validation errors returned by [`PostId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostIdValidationError {
    #[error("post id must not be empty")]
    Empty,
}

/// Store-assigned post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(String);

impl PostId {
    /// Validate and construct a [`PostId`].
    pub fn new(id: impl Into<String>) -> Result<Self, PostIdValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PostIdValidationError::Empty);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PostId> for String {
    fn from(value: PostId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostId {
    type Error = PostIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A comment embedded in its parent post.
///
/// `id` is unique within the parent post only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: UserId,
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A published photo post.
///
/// ## Invariants
/// - `likes` holds each user id at most once when mutated through
///   [`crate::domain::PostService::toggle_like`].
/// - `hashtags` were extracted from `caption` at creation and are never
///   recomputed.
/// - `category` and `caption` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub username: String,
    pub user_avatar: String,
    pub image_url: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub likes: Vec<UserId>,
    pub comments: Vec<Comment>,
    pub category: Category,
    pub timestamp: DateTime<Utc>,
    pub filter: String,
}

impl Post {
    /// Whether `user_id` currently likes the post.
    pub fn is_liked_by(&self, user_id: &UserId) -> bool {
        self.likes.contains(user_id)
    }

    /// Number of likes.
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Number of comments.
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

/// Preset image filters offered by the upload form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFilter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Bright,
    Contrast,
}

impl ImageFilter {
    /// Presets in the order they are offered.
    pub const fn presets() -> [Self; 5] {
        [
            Self::None,
            Self::Grayscale,
            Self::Sepia,
            Self::Bright,
            Self::Contrast,
        ]
    }

    /// Filter expression stored on the post.
    pub const fn expression(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale(1)",
            Self::Sepia => "sepia(0.6)",
            Self::Bright => "brightness(1.2)",
            Self::Contrast => "contrast(1.4)",
        }
    }
}

/// Caller-supplied fields for a new post.
///
/// `filter` is stored verbatim; [`ImageFilter`] lists the presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub image_url: String,
    pub caption: String,
    pub category: Category,
    pub filter: String,
}

impl PostDraft {
    /// Draft with no image filter applied.
    pub fn new(image_url: impl Into<String>, caption: impl Into<String>, category: Category) -> Self {
        Self {
            image_url: image_url.into(),
            caption: caption.into(),
            category,
            filter: ImageFilter::None.expression().to_owned(),
        }
    }

    /// Replace the filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}
