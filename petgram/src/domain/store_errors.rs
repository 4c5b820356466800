//! Translation of document store failures into domain errors.

use crate::domain::Error;
use crate::domain::ports::{DocumentPath, DocumentStoreError};

/// Reads surface as transport failures.
pub(crate) fn map_store_read_error(path: &DocumentPath, err: DocumentStoreError) -> Error {
    Error::transport_failure(format!("failed to read {path}: {err}"))
}

/// Writes, merges and key reservations surface as write failures.
pub(crate) fn map_store_write_error(path: &DocumentPath, err: DocumentStoreError) -> Error {
    Error::write_failed(format!("failed to write {path}: {err}"))
}
