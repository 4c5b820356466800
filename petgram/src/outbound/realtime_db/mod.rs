//! REST realtime database adapter.
//!
//! This module provides a thin HTTP implementation of the `DocumentStore`
//! port against a database exposing `GET`/`PUT`/`PATCH` on
//! `<base>/<path>.json`.

mod http_store;

pub use http_store::RealtimeDbStore;
