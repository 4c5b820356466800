//! Post data access.
//!
//! Every operation reads and writes whole documents through the
//! [`DocumentStore`] port. Mutations read the current post, change one
//! collection field and write that field back, so two concurrent writers
//! to the same field can lose an update.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::domain::ports::{DocumentPath, DocumentPathValidationError, DocumentStore};
use crate::domain::records::{
    CommentRecord, DecodedPosts, PostRecord, decode_post, decode_posts, encode_posts,
    is_empty_collection,
};
use crate::domain::store_errors::{map_store_read_error, map_store_write_error};
use crate::domain::{Comment, Error, Post, PostDraft, PostId, User, UserId, extract_hashtags};

/// Result of attempting to seed the posts collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingResult {
    /// The collection was empty and the fixtures were written.
    Applied,
    /// The collection already held posts; nothing was written.
    AlreadySeeded,
}

/// Post service over a [`DocumentStore`].
pub struct PostService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for PostService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> PostService<S> {
    /// Create a new service with the given store and clock.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(3)
    }
}

impl<S> PostService<S>
where
    S: DocumentStore,
{
    /// List every post, newest first.
    ///
    /// Read failures yield an empty list. The failure is logged at `warn`
    /// so an empty feed and a failed fetch can be told apart; use
    /// [`PostService::try_list_posts`] to observe the error directly.
    pub async fn list_posts(&self) -> Vec<Post> {
        match self.try_list_posts().await {
            Ok(posts) => posts,
            Err(err) => {
                warn!(error = %err, "listing posts failed; returning an empty feed");
                Vec::new()
            }
        }
    }

    /// List every post, newest first, reporting read failures.
    ///
    /// Posts with equal timestamps keep the store's iteration order.
    /// Records that cannot be decoded are skipped with a warning.
    pub async fn try_list_posts(&self) -> Result<Vec<Post>, Error> {
        let path = DocumentPath::posts();
        let raw = self
            .store
            .read(&path)
            .await
            .map_err(|err| map_store_read_error(&path, err))?;

        let DecodedPosts { mut posts, skipped } = decode_posts(raw);
        for record in skipped {
            warn!(post_key = %record.key, reason = %record.reason, "skipping malformed post record");
        }
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(posts)
    }

    /// Publish a new post as `author`.
    ///
    /// Hashtags are extracted from the caption, likes and comments start
    /// empty, and the author's current username and avatar are copied onto
    /// the post.
    pub async fn create_post(&self, author: Option<&User>, draft: PostDraft) -> Result<Post, Error> {
        let Some(author) = author else {
            return Err(Error::unauthenticated("User not authenticated"));
        };
        if draft.image_url.trim().is_empty() {
            return Err(Error::invalid_request("an image is required to create a post"));
        }

        let collection = DocumentPath::posts();
        let key = self
            .store
            .append_child(&collection)
            .await
            .map_err(|err| map_store_write_error(&collection, err))?;
        let id = PostId::new(key.as_str())
            .map_err(|err| Error::internal(format!("store issued an unusable key: {err}")))?;
        let path = post_path(&id)
            .map_err(|err| Error::internal(format!("store issued an unusable key: {err}")))?;

        let post = Post {
            id,
            user_id: author.id().clone(),
            username: author.username().to_owned(),
            user_avatar: author.avatar().to_owned(),
            hashtags: extract_hashtags(&draft.caption),
            image_url: draft.image_url,
            caption: draft.caption,
            likes: Vec::new(),
            comments: Vec::new(),
            category: draft.category,
            timestamp: self.now(),
            filter: draft.filter,
        };
        let record = encode_record(&PostRecord::from_post(&post))?;
        self.store
            .write(&path, record)
            .await
            .map_err(|err| map_store_write_error(&path, err))?;

        info!(post_id = %post.id, user_id = %post.user_id, "post created");
        Ok(post)
    }

    /// Add or remove `user_id` from the post's likes.
    ///
    /// A present id has exactly one occurrence removed; an absent id is
    /// appended. The whole likes sequence is written back.
    pub async fn toggle_like(&self, post_id: &PostId, user_id: &UserId) -> Result<Post, Error> {
        let (path, mut post) = self.load_post(post_id).await?;

        match post.likes.iter().position(|liker| liker == user_id) {
            Some(index) => {
                post.likes.remove(index);
            }
            None => post.likes.push(user_id.clone()),
        }

        self.merge_field(&path, "likes", &post.likes).await?;
        Ok(post)
    }

    /// Append a comment from `author` to the post.
    pub async fn add_comment(
        &self,
        author: Option<&User>,
        post_id: &PostId,
        text: &str,
    ) -> Result<Post, Error> {
        let Some(author) = author else {
            return Err(Error::unauthenticated("User not authenticated"));
        };
        if text.trim().is_empty() {
            return Err(Error::invalid_request("comment text must not be empty"));
        }

        let (path, mut post) = self.load_post(post_id).await?;
        let timestamp = self.now();
        post.comments.push(Comment {
            id: format!("comment_{}", timestamp.timestamp_millis()),
            user_id: author.id().clone(),
            username: author.username().to_owned(),
            text: text.to_owned(),
            timestamp,
        });

        let records: Vec<CommentRecord> =
            post.comments.iter().map(CommentRecord::from_comment).collect();
        self.merge_field(&path, "comments", &records).await?;
        Ok(post)
    }

    /// Write `fixtures` only when the posts collection is empty.
    ///
    /// An absent collection and an empty object both count as empty.
    pub async fn seed_if_empty(&self, fixtures: &[Post]) -> Result<SeedingResult, Error> {
        let path = DocumentPath::posts();
        let existing = self
            .store
            .read(&path)
            .await
            .map_err(|err| map_store_read_error(&path, err))?;

        if !is_empty_collection(existing.as_ref()) {
            info!("posts collection already populated; skipping seed");
            return Ok(SeedingResult::AlreadySeeded);
        }

        self.replace_collection(&path, fixtures).await?;
        info!(post_count = fixtures.len(), "seeded posts collection");
        Ok(SeedingResult::Applied)
    }

    /// Replace the posts collection with `fixtures`, whatever it holds.
    pub async fn force_seed(&self, fixtures: &[Post]) -> Result<(), Error> {
        let path = DocumentPath::posts();
        self.replace_collection(&path, fixtures).await?;
        info!(post_count = fixtures.len(), "force seeded posts collection");
        Ok(())
    }

    async fn replace_collection(&self, path: &DocumentPath, posts: &[Post]) -> Result<(), Error> {
        let collection = encode_posts(posts)
            .map_err(|err| Error::internal(format!("failed to encode posts: {err}")))?;
        self.store
            .write(path, collection)
            .await
            .map_err(|err| map_store_write_error(path, err))
    }

    async fn load_post(&self, post_id: &PostId) -> Result<(DocumentPath, Post), Error> {
        // Ids that cannot address a document can never have been stored.
        let path = post_path(post_id).map_err(|_| post_not_found(post_id))?;
        let raw = self
            .store
            .read(&path)
            .await
            .map_err(|err| map_store_read_error(&path, err))?;
        let Some(raw) = raw.filter(|value| !value.is_null()) else {
            return Err(post_not_found(post_id));
        };
        let post = decode_post(post_id.as_ref(), raw).map_err(|reason| {
            Error::internal(format!("stored post {post_id} is malformed: {reason}"))
        })?;
        Ok((path, post))
    }

    async fn merge_field<T: Serialize>(
        &self,
        path: &DocumentPath,
        field: &str,
        value: &T,
    ) -> Result<(), Error> {
        let mut partial = Map::new();
        partial.insert(field.to_owned(), encode_record(value)?);
        self.store
            .merge(path, partial)
            .await
            .map_err(|err| map_store_write_error(path, err))
    }
}

fn post_path(post_id: &PostId) -> Result<DocumentPath, DocumentPathValidationError> {
    DocumentPath::posts().child(post_id.as_ref())
}

fn post_not_found(post_id: &PostId) -> Error {
    Error::not_found("Post not found").with_details(json!({ "postId": post_id.as_ref() }))
}

fn encode_record<T: Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value)
        .map_err(|err| Error::internal(format!("failed to encode record: {err}")))
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
