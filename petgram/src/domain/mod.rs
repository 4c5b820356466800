//! Domain primitives, ports and services.
//!
//! Purpose: model users, posts and comments as strongly typed values, and
//! implement the session, data access and feed behaviour against the
//! [`ports`] so adapters stay swappable.
//!
//! Public surface:
//! - Error / ErrorCode: failure taxonomy shared by every operation.
//! - User, Post, Comment, Category: the data model.
//! - SessionService: sign-up, log-in, log-out and session subscriptions.
//! - PostService: listing, creating, liking, commenting and seeding.
//! - FeedController: the feed state machine.

pub mod auth;
pub mod error;
pub mod example_data;
pub mod feed_controller;
pub mod hashtags;
pub mod ports;
pub mod post;
pub mod post_service;
mod records;
pub mod session_service;
mod store_errors;
pub mod user;

pub use self::auth::{Credentials, CredentialsValidationError, SignUpRequest};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::example_data::{FixtureConversionError, fixture_posts};
pub use self::feed_controller::{AUTH_BOOTSTRAP_TIMEOUT, FeedController, FeedPhase};
pub use self::hashtags::extract_hashtags;
pub use self::post::{
    Category, CategoryFilter, CategoryParseError, Comment, ImageFilter, Post, PostDraft, PostId,
    PostIdValidationError,
};
pub use self::post_service::{PostService, SeedingResult};
pub use self::session_service::{SessionService, SessionSubscription};
pub use self::user::{DEFAULT_USERNAME, User, UserId, UserValidationError, seeded_avatar_url};
