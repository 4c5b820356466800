//! Petgram core library: a photo feed over an external authentication
//! provider and a tree-shaped document store.

pub mod config;
pub mod domain;
pub mod fixtures;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;
