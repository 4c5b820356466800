//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory_store** / **memory_auth**: process-local adapters used for
//!   demos and behaviour tests.
//! - **realtime_db**: REST realtime database document store.
//! - **push_key**: chronologically ordered child keys shared by the stores.
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory_auth;
pub mod memory_store;
pub mod push_key;
pub mod realtime_db;

pub use memory_auth::InMemoryAuthProvider;
pub use memory_store::InMemoryDocumentStore;
pub use push_key::PushKeyGenerator;
pub use realtime_db::RealtimeDbStore;
