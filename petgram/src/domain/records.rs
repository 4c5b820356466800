//! Wire shapes for documents held in the store.
//!
//! Post records are keyed by their id, so the id itself is not stored.
//! Collection fields are tolerant of the store's habit of dropping empty
//! arrays and of returning sparse arrays as index-keyed objects.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Category, Comment, Post, PostId, UserId};

/// Stored form of a [`Post`], minus its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostRecord {
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub user_avatar: String,
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default, deserialize_with = "sequence")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "sequence")]
    pub likes: Vec<UserId>,
    #[serde(default, deserialize_with = "sequence")]
    pub comments: Vec<CommentRecord>,
    pub category: Category,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "none".to_owned()
}

impl PostRecord {
    pub fn from_post(post: &Post) -> Self {
        Self {
            user_id: post.user_id.clone(),
            username: post.username.clone(),
            user_avatar: post.user_avatar.clone(),
            image_url: post.image_url.clone(),
            caption: post.caption.clone(),
            hashtags: post.hashtags.clone(),
            likes: post.likes.clone(),
            comments: post.comments.iter().map(CommentRecord::from_comment).collect(),
            category: post.category,
            timestamp: post.timestamp,
            filter: post.filter.clone(),
        }
    }

    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            user_id: self.user_id,
            username: self.username,
            user_avatar: self.user_avatar,
            image_url: self.image_url,
            caption: self.caption,
            hashtags: self.hashtags,
            likes: self.likes,
            comments: self
                .comments
                .into_iter()
                .map(CommentRecord::into_comment)
                .collect(),
            category: self.category,
            timestamp: self.timestamp,
            filter: self.filter,
        }
    }
}

/// Stored form of a [`Comment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentRecord {
    pub id: String,
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl CommentRecord {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            user_id: comment.user_id.clone(),
            username: comment.username.clone(),
            text: comment.text.clone(),
            timestamp: comment.timestamp,
        }
    }

    pub fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            text: self.text,
            timestamp: self.timestamp,
        }
    }
}

/// Profile record stored under `users/<uid>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProfileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileRecord {
    pub fn new(username: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            avatar: Some(avatar.into()),
        }
    }

    /// Stored username, ignoring blanks.
    pub fn username(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    /// Stored avatar, ignoring blanks.
    pub fn avatar(&self) -> Option<&str> {
        non_blank(self.avatar.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A child of the posts collection that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SkippedRecord {
    pub key: String,
    pub reason: String,
}

/// Outcome of decoding the posts collection.
#[derive(Debug, Default)]
pub(crate) struct DecodedPosts {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedRecord>,
}

/// Whether a collection read counts as empty.
///
/// The store drops empty collections, so absence, `null` and `{}` all
/// count.
pub(crate) fn is_empty_collection(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.iter().all(Value::is_null),
        Some(_) => false,
    }
}

/// Decode every child of the posts collection, in store iteration order.
pub(crate) fn decode_posts(value: Option<Value>) -> DecodedPosts {
    let entries: Vec<(String, Value)> = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Some(other) => {
            return DecodedPosts {
                posts: Vec::new(),
                skipped: vec![SkippedRecord {
                    key: String::new(),
                    reason: format!("posts collection is not an object: {other}"),
                }],
            };
        }
    };

    let mut decoded = DecodedPosts::default();
    for (key, raw) in entries {
        match decode_post(&key, raw) {
            Ok(post) => decoded.posts.push(post),
            Err(reason) => decoded.skipped.push(SkippedRecord { key, reason }),
        }
    }
    decoded
}

/// Decode one post stored under `key`.
pub(crate) fn decode_post(key: &str, raw: Value) -> Result<Post, String> {
    let id = PostId::new(key).map_err(|err| err.to_string())?;
    let record: PostRecord = serde_json::from_value(raw).map_err(|err| err.to_string())?;
    Ok(record.into_post(id))
}

/// Encode posts as a collection object keyed by id.
pub(crate) fn encode_posts(posts: &[Post]) -> Result<Value, serde_json::Error> {
    let mut collection = Map::with_capacity(posts.len());
    for post in posts {
        let record = serde_json::to_value(PostRecord::from_post(post))?;
        collection.insert(post.id.to_string(), record);
    }
    Ok(Value::Object(collection))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSequence<T> {
    List(Vec<Option<T>>),
    Indexed(BTreeMap<String, T>),
}

/// Accept a missing, `null`, array, or index-keyed object sequence.
fn sequence<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<RawSequence<T>>::deserialize(deserializer)?;
    match raw {
        None => Ok(Vec::new()),
        Some(RawSequence::List(items)) => Ok(items.into_iter().flatten().collect()),
        Some(RawSequence::Indexed(entries)) => {
            let mut indexed = entries
                .into_iter()
                .map(|(key, item)| {
                    key.parse::<u64>()
                        .map(|index| (index, item))
                        .map_err(|_| D::Error::custom(format!("non-numeric sequence key '{key}'")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            indexed.sort_by_key(|(index, _)| *index);
            Ok(indexed.into_iter().map(|(_, item)| item).collect())
        }
    }
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
