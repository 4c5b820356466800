//! Conversion of demonstration fixtures into domain posts.
//!
//! The fixture crate knows nothing about domain types; this module resolves
//! its relative timestamps against the injected clock and validates every
//! field on the way in.

use chrono::{DateTime, Utc};
use example_data::{ExampleCommentSeed, ExamplePostSeed, FixtureSet};
use thiserror::Error;

use super::{
    Category, CategoryParseError, Comment, Post, PostId, PostIdValidationError, UserId,
    UserValidationError,
};

/// Errors raised while turning fixture records into posts.
#[derive(Debug, Error)]
pub enum FixtureConversionError {
    /// A post key failed validation.
    #[error("fixture post id is invalid: {0}")]
    PostId(#[from] PostIdValidationError),
    /// An author or liker id failed validation.
    #[error("fixture post {post_id} has an invalid user id: {source}")]
    UserId {
        post_id: String,
        #[source]
        source: UserValidationError,
    },
    /// The category is not one of the supported values.
    #[error("fixture post {post_id} has an invalid category: {source}")]
    Category {
        post_id: String,
        #[source]
        source: CategoryParseError,
    },
}

/// Resolve `set` at `now` and convert each record into a [`Post`].
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use example_data::FixtureSet;
/// use petgram::domain::fixture_posts;
///
/// let set = FixtureSet::embedded().expect("embedded fixtures parse");
/// let posts = fixture_posts(&set, Utc::now()).expect("fixtures convert");
/// assert_eq!(posts.len(), 3);
/// ```
pub fn fixture_posts(set: &FixtureSet, now: DateTime<Utc>) -> Result<Vec<Post>, FixtureConversionError> {
    set.resolve(now).into_iter().map(convert_post).collect()
}

fn convert_post(seed: ExamplePostSeed) -> Result<Post, FixtureConversionError> {
    let post_id = seed.id;
    let user_id = |raw: &str| {
        UserId::new(raw).map_err(|source| FixtureConversionError::UserId {
            post_id: post_id.clone(),
            source,
        })
    };

    let author = user_id(&seed.user_id)?;
    let likes = seed
        .likes
        .iter()
        .map(|raw| user_id(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let comments = seed
        .comments
        .into_iter()
        .map(|comment| convert_comment(comment, &user_id))
        .collect::<Result<Vec<_>, _>>()?;
    let category = seed
        .category
        .parse::<Category>()
        .map_err(|source| FixtureConversionError::Category {
            post_id: post_id.clone(),
            source,
        })?;

    Ok(Post {
        id: PostId::new(post_id.clone())?,
        user_id: author,
        username: seed.username,
        user_avatar: seed.user_avatar,
        image_url: seed.image_url,
        caption: seed.caption,
        hashtags: seed.hashtags,
        likes,
        comments,
        category,
        timestamp: seed.timestamp,
        filter: seed.filter,
    })
}

fn convert_comment(
    seed: ExampleCommentSeed,
    user_id: &impl Fn(&str) -> Result<UserId, FixtureConversionError>,
) -> Result<Comment, FixtureConversionError> {
    Ok(Comment {
        id: seed.id,
        user_id: user_id(&seed.user_id)?,
        username: seed.username,
        text: seed.text,
        timestamp: seed.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[rstest]
    fn embedded_fixtures_convert(now: DateTime<Utc>) {
        let set = FixtureSet::embedded().expect("embedded fixtures parse");
        let posts = fixture_posts(&set, now).expect("fixtures convert");

        let summary: Vec<(String, Category)> = posts
            .iter()
            .map(|post| (post.id.to_string(), post.category))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("post_1".to_owned(), Category::Dog),
                ("post_2".to_owned(), Category::Cat),
                ("post_3".to_owned(), Category::Bird),
            ]
        );
        let first = posts.first().expect("first post");
        assert_eq!(first.timestamp, now - Duration::minutes(10));
    }

    #[rstest]
    fn unknown_category_is_rejected(now: DateTime<Utc>) {
        let json = r#"{
            "version": 1,
            "posts": [{
                "id": "p1", "userId": "u1", "username": "A", "userAvatar": "",
                "imageUrl": "x", "caption": "", "category": "fish",
                "minutesAgo": 1, "filter": "none"
            }]
        }"#;
        let set = FixtureSet::from_json(json).expect("fixture set parses");
        let err = fixture_posts(&set, now).expect_err("category rejected");
        assert!(matches!(err, FixtureConversionError::Category { .. }));
    }
}
