//! Shared helpers for unit tests.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::AuthIdentity;
use crate::domain::{Category, Post, PostId, User, UserId};

/// Instant used by tests that need a fixed "now".
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_millis(&self, millis: i64) {
        *self.lock_clock() += TimeDelta::milliseconds(millis);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub fn fixture_clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(fixture_timestamp()))
}

pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

pub fn identity(uid: &str) -> AuthIdentity {
    AuthIdentity::new(user_id(uid), Some(format!("{uid}@example.test")))
}

pub fn user(uid: &str, username: &str) -> User {
    User::new(
        user_id(uid),
        format!("{uid}@example.test"),
        username,
        format!("https://example.test/{uid}.png"),
    )
}

/// Post authored by `author` at `minutes` past the fixture timestamp.
pub fn post(id: &str, author: &str, category: Category, minutes: i64) -> Post {
    Post {
        id: PostId::new(id).expect("valid post id"),
        user_id: user_id(author),
        username: author.to_owned(),
        user_avatar: format!("https://example.test/{author}.png"),
        image_url: format!("https://example.test/{id}.jpg"),
        caption: format!("post {id}"),
        hashtags: Vec::new(),
        likes: Vec::new(),
        comments: Vec::new(),
        category,
        timestamp: fixture_timestamp() + TimeDelta::minutes(minutes),
        filter: "none".to_owned(),
    }
}
