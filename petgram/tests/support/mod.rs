//! Shared wiring for behaviour tests over the in-memory adapters.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use petgram::domain::{Post, PostService, SessionService, SignUpRequest};
use petgram::fixtures::load_fixture_posts;
use petgram::outbound::{InMemoryAuthProvider, InMemoryDocumentStore};

/// Clock that starts at a fixed instant and moves only when stepped.
#[derive(Debug)]
pub struct StepClock(Mutex<DateTime<Utc>>);

impl StepClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn step_seconds(&self, seconds: i64) {
        *self.0.lock().expect("clock lock") += TimeDelta::seconds(seconds);
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid instant")
}

/// Services wired to fresh in-memory adapters sharing one clock.
pub struct Harness {
    pub clock: Arc<StepClock>,
    pub auth: Arc<InMemoryAuthProvider>,
    pub store: Arc<InMemoryDocumentStore>,
    pub sessions: SessionService<InMemoryAuthProvider, InMemoryDocumentStore>,
    pub posts: PostService<InMemoryDocumentStore>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(StepClock::starting_at(start_instant()));
        let auth = Arc::new(InMemoryAuthProvider::new());
        let store = Arc::new(InMemoryDocumentStore::new(clock.clone()));
        let sessions = SessionService::new(Arc::clone(&auth), Arc::clone(&store));
        let posts = PostService::new(Arc::clone(&store), clock.clone());
        Self {
            clock,
            auth,
            store,
            sessions,
            posts,
        }
    }

    /// Embedded fixture posts resolved at the current clock reading.
    pub fn fixtures(&self) -> Vec<Post> {
        load_fixture_posts(None, self.clock.utc()).expect("embedded fixtures load")
    }
}

pub fn sign_up_request(email: &str, username: &str) -> SignUpRequest {
    SignUpRequest::try_from_parts(email, "hunter22", username).expect("valid sign-up request")
}
