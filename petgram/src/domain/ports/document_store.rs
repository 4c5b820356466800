//! Port abstraction for the tree-shaped remote document store.
//!
//! Values are JSON trees addressed by [`DocumentPath`]. Stores may represent
//! an empty collection as an absent node, so callers must treat `None` and
//! an empty object alike.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{DocumentPath, define_port_error};

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// The store refused the request (permissions, validation rules).
        Rejected { message: String } => "document store rejected the request: {message}",
        /// A value could not be encoded or decoded.
        Serialization { message: String } => "document store serialisation failed: {message}",
    }
}

/// Key-path addressed document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the value at `path`, or `None` when the node is absent.
    async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, DocumentStoreError>;

    /// Replace the value at `path`. Writing `null` removes the node.
    async fn write(&self, path: &DocumentPath, value: Value) -> Result<(), DocumentStoreError>;

    /// Replace only the named children of `path`, leaving siblings intact.
    async fn merge(
        &self,
        path: &DocumentPath,
        partial: Map<String, Value>,
    ) -> Result<(), DocumentStoreError>;

    /// Reserve a new, chronologically ordered child key under `path`.
    ///
    /// Nothing is written; callers follow up with [`DocumentStore::write`].
    async fn append_child(&self, path: &DocumentPath) -> Result<String, DocumentStoreError>;
}
