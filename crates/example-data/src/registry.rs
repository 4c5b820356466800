//! Fixture document types and JSON parsing.
//!
//! A fixture document is a versioned list of demonstration posts. Post
//! and comment timestamps are stored as offsets ("minutes ago") so the
//! demo feed always looks recent; [`FixtureSet::resolve`] turns them into
//! absolute instants.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::error::FixtureError;
use crate::seed::{ExampleCommentSeed, ExamplePostSeed};

/// Current supported fixture document version.
const SUPPORTED_VERSION: u32 = 1;

/// Fixture document compiled into the crate.
const EMBEDDED_FIXTURES: &str = include_str!("../fixtures/demo-posts.json");

/// A validated set of demonstration posts.
///
/// # Example
///
/// ```
/// use example_data::FixtureSet;
///
/// let json = r#"{
///     "version": 1,
///     "posts": [{
///         "id": "post_a", "userId": "u1", "username": "Ada",
///         "userAvatar": "https://example.test/a.png",
///         "imageUrl": "https://example.test/a.jpg",
///         "caption": "hello #world", "category": "dog",
///         "minutesAgo": 3, "filter": "none"
///     }]
/// }"#;
///
/// let fixtures = FixtureSet::from_json(json).expect("valid fixtures");
/// assert_eq!(fixtures.posts().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    version: u32,
    posts: Vec<FixturePost>,
}

impl FixtureSet {
    /// Parses a fixture set from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] if:
    /// - The JSON is malformed or required fields are missing
    /// - The version is unsupported
    /// - The posts array is empty
    /// - A post id is blank or repeated
    /// - A comment id repeats within its post
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let raw: RawFixtureSet =
            serde_json::from_str(json).map_err(|e| FixtureError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Parses the fixture set compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] if the embedded document fails validation.
    pub fn embedded() -> Result<Self, FixtureError> {
        Self::from_json(EMBEDDED_FIXTURES)
    }

    fn from_raw(raw: RawFixtureSet) -> Result<Self, FixtureError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(FixtureError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.posts.is_empty() {
            return Err(FixtureError::EmptyPosts);
        }

        let mut seen_ids = HashSet::with_capacity(raw.posts.len());
        for (index, post) in raw.posts.iter().enumerate() {
            if post.id.trim().is_empty() {
                return Err(FixtureError::EmptyPostId { index });
            }
            if !seen_ids.insert(post.id.as_str()) {
                return Err(FixtureError::DuplicatePostId {
                    id: post.id.clone(),
                });
            }
            validate_comment_ids(post)?;
        }

        Ok(Self {
            version: raw.version,
            posts: raw.posts,
        })
    }

    /// Returns the document version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the raw post definitions in document order.
    #[must_use]
    pub fn posts(&self) -> &[FixturePost] {
        &self.posts
    }

    /// Resolves relative timestamps against `now`, preserving document order.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> Vec<ExamplePostSeed> {
        self.posts
            .iter()
            .map(|post| ExamplePostSeed {
                id: post.id.clone(),
                user_id: post.user_id.clone(),
                username: post.username.clone(),
                user_avatar: post.user_avatar.clone(),
                image_url: post.image_url.clone(),
                caption: post.caption.clone(),
                hashtags: post.hashtags.clone(),
                likes: post.likes.clone(),
                comments: post
                    .comments
                    .iter()
                    .map(|comment| ExampleCommentSeed {
                        id: comment.id.clone(),
                        user_id: comment.user_id.clone(),
                        username: comment.username.clone(),
                        text: comment.text.clone(),
                        timestamp: minutes_before(now, comment.minutes_ago),
                    })
                    .collect(),
                category: post.category.clone(),
                timestamp: minutes_before(now, post.minutes_ago),
                filter: post.filter.clone(),
            })
            .collect()
    }
}

fn validate_comment_ids(post: &FixturePost) -> Result<(), FixtureError> {
    let mut seen = HashSet::with_capacity(post.comments.len());
    for comment in &post.comments {
        if !seen.insert(comment.id.as_str()) {
            return Err(FixtureError::DuplicateCommentId {
                post_id: post.id.clone(),
                comment_id: comment.id.clone(),
            });
        }
    }
    Ok(())
}

fn minutes_before(now: DateTime<Utc>, minutes_ago: u32) -> DateTime<Utc> {
    now.checked_sub_signed(TimeDelta::minutes(i64::from(minutes_ago)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A demonstration post as written in the fixture document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixturePost {
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
    /// Hashtags as stored; fixtures carry them precomputed.
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Identifiers of users who liked the post.
    #[serde(default)]
    pub likes: Vec<String>,
    /// Comments in display order.
    #[serde(default)]
    pub comments: Vec<FixtureComment>,
    /// Lowercase category name.
    pub category: String,
    /// Age of the post in minutes.
    pub minutes_ago: u32,
    /// Image filter expression.
    pub filter: String,
}

/// A demonstration comment as written in the fixture document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureComment {
    /// Identifier unique within the parent post.
    pub id: String,
    /// Author identifier.
    pub user_id: String,
    /// Author display name snapshot.
    pub username: String,
    /// Comment body.
    pub text: String,
    /// Age of the comment in minutes.
    pub minutes_ago: u32,
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFixtureSet {
    version: u32,
    posts: Vec<FixturePost>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    const ONE_POST: &str = r#"{
        "version": 1,
        "posts": [{
            "id": "post_a", "userId": "u1", "username": "Ada",
            "userAvatar": "a", "imageUrl": "i", "caption": "c",
            "category": "cat", "minutesAgo": 90, "filter": "none",
            "comments": [
                {"id": "c1", "userId": "u2", "username": "Bo", "text": "hi", "minutesAgo": 30}
            ]
        }]
    }"#;

    #[test]
    fn embedded_fixture_set_is_valid() {
        let fixtures = FixtureSet::embedded().expect("embedded fixtures parse");
        let ids: Vec<&str> = fixtures.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["post_1", "post_2", "post_3"]);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let fixtures = FixtureSet::from_json(ONE_POST).expect("valid fixtures");
        let post = fixtures.posts().first().expect("one post");
        assert!(post.likes.is_empty());
        assert!(post.hashtags.is_empty());
        assert_eq!(post.comments.len(), 1);
    }

    #[test]
    fn resolve_subtracts_offsets_from_now() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid instant");
        let fixtures = FixtureSet::from_json(ONE_POST).expect("valid fixtures");
        let seeds = fixtures.resolve(now);
        let post = seeds.first().expect("one post");

        assert_eq!(post.timestamp, now - TimeDelta::minutes(90));
        let comment = post.comments.first().expect("one comment");
        assert_eq!(comment.timestamp, now - TimeDelta::minutes(30));
    }

    #[rstest]
    #[case::unsupported_version(
        r#"{"version": 2, "posts": []}"#,
        FixtureError::UnsupportedVersion { expected: 1, actual: 2 }
    )]
    #[case::empty_posts(r#"{"version": 1, "posts": []}"#, FixtureError::EmptyPosts)]
    #[case::blank_id(
        r#"{"version": 1, "posts": [{"id": " ", "userId": "u", "username": "n", "userAvatar": "a", "imageUrl": "i", "caption": "c", "category": "dog", "minutesAgo": 1, "filter": "none"}]}"#,
        FixtureError::EmptyPostId { index: 0 }
    )]
    fn rejects_invalid_documents(#[case] json: &str, #[case] expected: FixtureError) {
        assert_eq!(FixtureSet::from_json(json), Err(expected));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = FixtureSet::from_json("not json");
        assert!(matches!(result, Err(FixtureError::ParseError { .. })));
    }
}
