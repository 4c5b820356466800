//! Demonstration post fixtures used to populate an empty feed.
//!
//! This crate owns the fixed collection of example posts that the feed
//! writes into an empty document store. It is deliberately independent of
//! the application's domain types: callers receive plain seed records and
//! convert them at the point of use.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Loading a versioned fixture document from JSON
//! - An embedded default fixture set compiled into the crate
//! - Resolving relative ("minutes ago") timestamps against a supplied instant
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use example_data::FixtureSet;
//!
//! let fixtures = FixtureSet::embedded().expect("embedded fixtures are valid");
//! let posts = fixtures.resolve(Utc::now());
//!
//! assert_eq!(posts.len(), 3);
//! assert_eq!(posts.first().map(|post| post.id.as_str()), Some("post_1"));
//! ```

mod error;
mod registry;
mod seed;

pub use error::FixtureError;
pub use registry::{FixtureComment, FixturePost, FixtureSet};
pub use seed::{ExampleCommentSeed, ExamplePostSeed};
