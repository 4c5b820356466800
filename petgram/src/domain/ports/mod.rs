//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod document_path;
mod document_store;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthFailureCode, AuthIdentity, AuthProvider, AuthProviderError};
pub use document_path::{
    DocumentPath, DocumentPathValidationError, POSTS_COLLECTION, USERS_COLLECTION,
};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{DocumentStore, DocumentStoreError};
