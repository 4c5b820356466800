//! Behavioural tests for the feed across sign-up, posting and sign-out.
//!
//! Every service runs against the in-memory adapters, so session events
//! flow through the real subscription task rather than mocks.

use std::time::Duration;

use petgram::domain::ports::{AuthProvider, DocumentPath, DocumentStore};
use petgram::domain::{
    AUTH_BOOTSTRAP_TIMEOUT, Category, CategoryFilter, Credentials, ErrorCode, FeedController,
    FeedPhase, PostDraft, PostId, SeedingResult, User,
};
use petgram::outbound::{InMemoryAuthProvider, InMemoryDocumentStore};
use rstest::{fixture, rstest};
use tokio::sync::mpsc;

mod support;

use support::{Harness, sign_up_request};

type Controller = FeedController<InMemoryAuthProvider, InMemoryDocumentStore>;

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn controller(harness: &Harness) -> Controller {
    FeedController::new(
        harness.sessions.clone(),
        harness.posts.clone(),
        harness.fixtures(),
    )
}

fn post_id(raw: &str) -> PostId {
    PostId::new(raw).expect("valid post id")
}

fn ids(posts: &[petgram::domain::Post]) -> Vec<String> {
    posts.iter().map(|post| post.id.to_string()).collect()
}

/// Bootstrap signed out, sign up as Rex and process the sign-in event.
async fn signed_in(
    harness: &Harness,
    feed: &mut Controller,
    events: &mut mpsc::UnboundedReceiver<Option<User>>,
) -> User {
    assert_eq!(
        feed.bootstrap(events, AUTH_BOOTSTRAP_TIMEOUT).await,
        FeedPhase::SignedOut
    );
    let user = harness
        .sessions
        .sign_up(&sign_up_request("rex@example.test", "Rex"))
        .await
        .expect("sign-up succeeds");
    assert!(feed.process_next_event(events).await);
    user
}

#[rstest]
#[tokio::test]
async fn sign_up_seeds_the_empty_store_and_loads_the_feed(harness: Harness) {
    let mut feed = controller(&harness);
    let (_subscription, mut events) = harness.sessions.session_events();

    let user = signed_in(&harness, &mut feed, &mut events).await;

    assert_eq!(user.username(), "Rex");
    assert_eq!(user.avatar(), "https://picsum.photos/seed/Rex/48/48");
    assert_eq!(feed.phase(), FeedPhase::Ready);
    assert_eq!(feed.current_user().map(User::username), Some("Rex"));
    assert_eq!(ids(feed.posts()), ["post_1", "post_2", "post_3"]);
    assert_eq!(ids(feed.visible_posts()), ids(feed.posts()));
}

#[rstest]
#[tokio::test]
async fn posting_liking_and_commenting_reload_the_feed(harness: Harness) {
    let mut feed = controller(&harness);
    let (_subscription, mut events) = harness.sessions.session_events();
    let user = signed_in(&harness, &mut feed, &mut events).await;

    harness.clock.step_seconds(30);
    feed.open_upload();
    let created = feed
        .create_post(PostDraft::new(
            "https://example.test/corgi.jpg",
            "Zoomies at dawn #corgi #zoomies",
            Category::Dog,
        ))
        .await
        .expect("post created");

    assert!(!feed.is_upload_open());
    assert_eq!(created.hashtags, ["#corgi", "#zoomies"]);
    assert_eq!(created.username, "Rex");
    assert_eq!(feed.posts().first().map(|post| &post.id), Some(&created.id));
    assert_eq!(feed.posts().len(), 4);

    feed.select_category(CategoryFilter::Only(Category::Dog));
    assert_eq!(
        ids(feed.visible_posts()),
        [created.id.to_string(), "post_1".to_owned()]
    );

    let liked = feed
        .toggle_like(&post_id("post_2"))
        .await
        .expect("like toggles")
        .expect("signed in");
    assert!(liked.is_liked_by(user.id()));
    let unliked = feed
        .toggle_like(&post_id("post_2"))
        .await
        .expect("like toggles")
        .expect("signed in");
    assert!(!unliked.is_liked_by(user.id()));
    assert_eq!(unliked.like_count(), 1);

    let commented = feed
        .add_comment(&post_id("post_1"), "Adorable")
        .await
        .expect("comment added");
    let last = commented.comments.last().expect("new comment");
    assert_eq!(last.text, "Adorable");
    assert_eq!(last.username, "Rex");
    assert_eq!(commented.comment_count(), 2);
    let reloaded = feed
        .posts()
        .iter()
        .find(|post| post.id.as_ref() == "post_1")
        .expect("post_1 listed");
    assert_eq!(reloaded.comment_count(), 2);
}

#[rstest]
#[tokio::test]
async fn posts_deleted_elsewhere_leave_the_feed_on_the_next_mutation(harness: Harness) {
    let mut feed = controller(&harness);
    let (_subscription, mut events) = harness.sessions.session_events();
    signed_in(&harness, &mut feed, &mut events).await;
    let removed = DocumentPath::posts().child("post_2").expect("post path");
    harness
        .store
        .write(&removed, serde_json::Value::Null)
        .await
        .expect("delete post_2");

    let like = feed
        .toggle_like(&post_id("post_2"))
        .await
        .expect_err("post_2 is gone");
    assert_eq!(like.code(), ErrorCode::NotFound);
    assert_eq!(ids(feed.posts()), ["post_1", "post_3"]);

    harness
        .store
        .write(
            &DocumentPath::posts().child("post_3").expect("post path"),
            serde_json::Value::Null,
        )
        .await
        .expect("delete post_3");
    let comment = feed
        .add_comment(&post_id("post_3"), "hi")
        .await
        .expect_err("post_3 is gone");
    assert_eq!(comment.code(), ErrorCode::NotFound);
    assert_eq!(ids(feed.posts()), ["post_1"]);
    assert_eq!(feed.phase(), FeedPhase::Ready);
}

#[rstest]
#[tokio::test]
async fn failed_uploads_leave_the_form_open(harness: Harness) {
    let mut feed = controller(&harness);
    let (_subscription, mut events) = harness.sessions.session_events();
    signed_in(&harness, &mut feed, &mut events).await;

    feed.open_upload();
    let err = feed
        .create_post(PostDraft::new("", "no image", Category::Cat))
        .await
        .expect_err("image is required");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(feed.is_upload_open());
    assert_eq!(feed.posts().len(), 3);
}

#[rstest]
#[tokio::test]
async fn sign_out_clears_the_feed_and_sign_in_keeps_existing_posts(harness: Harness) {
    let mut feed = controller(&harness);
    let (_subscription, mut events) = harness.sessions.session_events();
    signed_in(&harness, &mut feed, &mut events).await;
    feed.open_upload();

    feed.log_out().await.expect("log out succeeds");
    assert!(feed.process_next_event(&mut events).await);

    assert_eq!(feed.phase(), FeedPhase::SignedOut);
    assert!(feed.current_user().is_none());
    assert!(feed.posts().is_empty());
    assert!(!feed.is_upload_open());
    assert!(
        feed.toggle_like(&post_id("post_1"))
            .await
            .expect("no-op while signed out")
            .is_none()
    );

    let credentials =
        Credentials::try_from_parts("REX@example.test", "hunter22").expect("valid credentials");
    let user = harness.sessions.log_in(&credentials).await.expect("log in");
    assert_eq!(user.username(), "Rex");
    assert!(feed.process_next_event(&mut events).await);

    assert_eq!(feed.phase(), FeedPhase::Ready);
    assert_eq!(feed.posts().len(), 3);
    let outcome = harness
        .posts
        .seed_if_empty(&harness.fixtures())
        .await
        .expect("seed check");
    assert_eq!(outcome, SeedingResult::AlreadySeeded);
}

#[rstest]
#[tokio::test]
async fn account_errors_surface_stable_codes(harness: Harness) {
    harness
        .sessions
        .sign_up(&sign_up_request("rex@example.test", "Rex"))
        .await
        .expect("first sign-up succeeds");

    let duplicate = harness
        .sessions
        .sign_up(&sign_up_request("rex@example.test", "Other"))
        .await
        .expect_err("email taken");
    assert_eq!(duplicate.code(), ErrorCode::DuplicateAccount);
    assert_eq!(duplicate.message(), "User with this email already exists.");

    let wrong =
        Credentials::try_from_parts("rex@example.test", "not-it").expect("valid credentials");
    let rejected = harness.sessions.log_in(&wrong).await.expect_err("bad password");
    assert_eq!(rejected.code(), ErrorCode::InvalidCredentials);
    assert_eq!(rejected.message(), "Invalid email or password.");
    assert_eq!(harness.auth.account_count(), 1);
}

#[rstest]
#[tokio::test]
async fn current_user_follows_the_provider_session(harness: Harness) {
    let err = harness
        .sessions
        .current_user()
        .await
        .expect_err("nobody signed in");
    assert_eq!(err.code(), ErrorCode::Unauthenticated);

    let created = harness
        .sessions
        .sign_up(&sign_up_request("kit@example.test", "Kit"))
        .await
        .expect("sign-up");
    let current = harness.sessions.current_user().await.expect("signed in");
    assert_eq!(current, created);
    assert!(harness.auth.current_identity().is_some());
}

#[tokio::test(start_paused = true)]
async fn silent_session_channel_times_out_into_signed_out() {
    let harness = Harness::new();
    let mut feed = controller(&harness);
    let (_sender, mut events) = mpsc::unbounded_channel::<Option<User>>();

    let phase = feed.bootstrap(&mut events, Duration::from_secs(5)).await;

    assert_eq!(phase, FeedPhase::SignedOut);
    assert!(feed.posts().is_empty());
}
