//! Feed application state.
//!
//! The controller is an explicit state machine driven by session events.
//! Every successful mutation is followed by a full reload of the post list;
//! the visible list is always recomputed from the last fetch and the
//! selected category, never patched.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domain::ports::{AuthProvider, DocumentStore};
use crate::domain::{
    CategoryFilter, Error, ErrorCode, Post, PostDraft, PostId, PostService, SessionService, User,
};

/// Default wait for the first session event before assuming signed out.
pub const AUTH_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle phase of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// Waiting for the first session event.
    AuthPending,
    /// Nobody is signed in.
    SignedOut,
    /// A post list fetch is in flight.
    Loading,
    /// The post list reflects the last fetch.
    Ready,
}

/// Stateful controller behind the feed screen.
pub struct FeedController<A, S> {
    sessions: SessionService<A, S>,
    posts: PostService<S>,
    fixtures: Vec<Post>,
    phase: FeedPhase,
    current_user: Option<User>,
    feed: Vec<Post>,
    filter: CategoryFilter,
    visible: Vec<Post>,
    upload_open: bool,
}

impl<A, S> FeedController<A, S>
where
    A: AuthProvider + 'static,
    S: DocumentStore + 'static,
{
    /// Build a controller that seeds `fixtures` into an empty store on
    /// sign-in.
    pub fn new(sessions: SessionService<A, S>, posts: PostService<S>, fixtures: Vec<Post>) -> Self {
        Self {
            sessions,
            posts,
            fixtures,
            phase: FeedPhase::AuthPending,
            current_user: None,
            feed: Vec::new(),
            filter: CategoryFilter::All,
            visible: Vec::new(),
            upload_open: false,
        }
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Posts from the last fetch, newest first.
    pub fn posts(&self) -> &[Post] {
        &self.feed
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    /// Posts matching the selected category, in feed order.
    pub fn visible_posts(&self) -> &[Post] {
        &self.visible
    }

    pub fn is_upload_open(&self) -> bool {
        self.upload_open
    }

    pub fn open_upload(&mut self) {
        self.upload_open = true;
    }

    pub fn close_upload(&mut self) {
        self.upload_open = false;
    }

    /// Wait for the first session event, treating silence as signed out.
    ///
    /// A closed channel is also treated as signed out.
    pub async fn bootstrap(
        &mut self,
        events: &mut mpsc::UnboundedReceiver<Option<User>>,
        timeout: Duration,
    ) -> FeedPhase {
        match tokio::time::timeout(timeout, events.recv()).await {
            Ok(Some(event)) => self.handle_session_event(event).await,
            Ok(None) => {
                warn!("session channel closed before the first event");
                self.sign_out_locally();
            }
            Err(_) => {
                warn!(?timeout, "no session event before timeout; assuming signed out");
                self.sign_out_locally();
            }
        }
        self.phase
    }

    /// Process session events in order until the channel closes.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<Option<User>>) {
        while self.process_next_event(events).await {}
    }

    /// Process one session event. Returns `false` once the channel closes.
    pub async fn process_next_event(
        &mut self,
        events: &mut mpsc::UnboundedReceiver<Option<User>>,
    ) -> bool {
        match events.recv().await {
            Some(event) => {
                self.handle_session_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Apply a session change.
    ///
    /// Sign-in seeds an empty store (failures are logged and ignored) and
    /// loads the feed. Sign-out clears the feed and closes the upload form.
    pub async fn handle_session_event(&mut self, user: Option<User>) {
        let Some(user) = user else {
            self.sign_out_locally();
            return;
        };

        self.current_user = Some(user);
        self.set_phase(FeedPhase::Loading);
        if let Err(err) = self.posts.seed_if_empty(&self.fixtures).await {
            warn!(error = %err, "seeding demonstration posts failed");
        }
        self.reload().await;
    }

    /// Reload the feed. Does nothing while signed out.
    pub async fn refresh(&mut self) {
        if self.current_user.is_none() {
            return;
        }
        self.set_phase(FeedPhase::Loading);
        self.reload().await;
    }

    /// Change the category filter and recompute the visible list.
    pub fn select_category(&mut self, filter: CategoryFilter) {
        self.filter = filter;
        self.recompute_visible();
    }

    /// Publish a post as the current user, then reload.
    ///
    /// Success closes the upload form; failure leaves it open.
    pub async fn create_post(&mut self, draft: PostDraft) -> Result<Post, Error> {
        let author = self.session_user().await?;
        let created = self
            .posts
            .create_post(author.as_ref(), draft)
            .await
            .inspect_err(|err| error!(error = %err, "creating post failed"))?;
        self.upload_open = false;
        self.refresh().await;
        Ok(created)
    }

    /// Toggle the current user's like, then reload.
    ///
    /// Returns `Ok(None)` without touching the store while signed out. A
    /// post that no longer exists is reported as `NotFound` after the feed
    /// has been reloaded without it.
    pub async fn toggle_like(&mut self, post_id: &PostId) -> Result<Option<Post>, Error> {
        let Some(user_id) = self.current_user.as_ref().map(|user| user.id().clone()) else {
            return Ok(None);
        };
        let updated = match self.posts.toggle_like(post_id, &user_id).await {
            Ok(post) => post,
            Err(err) => return Err(self.mutation_failed(post_id, "toggling like", err).await),
        };
        self.refresh().await;
        Ok(Some(updated))
    }

    /// Comment as the current user, then reload.
    ///
    /// Like [`Self::toggle_like`], a missing post reloads the feed before
    /// `NotFound` is returned.
    pub async fn add_comment(&mut self, post_id: &PostId, text: &str) -> Result<Post, Error> {
        let author = self.session_user().await?;
        let updated = match self.posts.add_comment(author.as_ref(), post_id, text).await {
            Ok(post) => post,
            Err(err) => return Err(self.mutation_failed(post_id, "adding comment", err).await),
        };
        self.refresh().await;
        Ok(updated)
    }

    /// Ask the provider to end the session.
    ///
    /// Local state changes when the resulting sign-out event arrives.
    pub async fn log_out(&self) -> Result<(), Error> {
        self.sessions.log_out().await
    }

    async fn session_user(&self) -> Result<Option<User>, Error> {
        match self.sessions.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(err) if err.code() == ErrorCode::Unauthenticated => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Log a failed post mutation and hand the error back.
    ///
    /// Only `NotFound` reloads the feed, so the vanished post disappears.
    async fn mutation_failed(&mut self, post_id: &PostId, action: &str, err: Error) -> Error {
        error!(post_id = %post_id, error = %err, "{action} failed");
        if err.code() == ErrorCode::NotFound {
            self.refresh().await;
        }
        err
    }

    async fn reload(&mut self) {
        self.feed = self.posts.list_posts().await;
        self.recompute_visible();
        self.set_phase(FeedPhase::Ready);
    }

    fn sign_out_locally(&mut self) {
        self.current_user = None;
        self.feed.clear();
        self.visible.clear();
        self.upload_open = false;
        self.set_phase(FeedPhase::SignedOut);
    }

    fn recompute_visible(&mut self) {
        self.visible = self.filter.apply(&self.feed);
    }

    fn set_phase(&mut self, next: FeedPhase) {
        if self.phase != next {
            debug!(from = ?self.phase, to = ?next, "feed phase changed");
        }
        self.phase = next;
    }
}

#[cfg(test)]
#[path = "feed_controller_tests.rs"]
mod tests;
