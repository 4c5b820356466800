//! In-memory document store.
//!
//! Holds one JSON tree behind a mutex and mirrors the remote store's
//! storage rules: `null` and empty containers are never stored, and
//! removing the last child of a node removes the node.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Map, Value};

use super::push_key::PushKeyGenerator;
use crate::domain::ports::{DocumentPath, DocumentStore, DocumentStoreError};

/// Document store backed by a process-local JSON tree.
pub struct InMemoryDocumentStore {
    root: Mutex<Value>,
    keys: PushKeyGenerator,
}

impl InMemoryDocumentStore {
    /// Empty store minting keys from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_root(Value::Object(Map::new()), clock)
    }

    /// Store pre-populated with `root`, normalised like any other write.
    pub fn with_root(root: Value, clock: Arc<dyn Clock>) -> Self {
        let root = normalise(root).unwrap_or_else(|| Value::Object(Map::new()));
        Self {
            root: Mutex::new(root),
            keys: PushKeyGenerator::new(clock),
        }
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> Value {
        match self.root.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_root(&self) -> Result<MutexGuard<'_, Value>, DocumentStoreError> {
        self.root
            .lock()
            .map_err(|_| DocumentStoreError::connection("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, DocumentStoreError> {
        let root = self.lock_root()?;
        let segments: Vec<&str> = path.segments().collect();
        Ok(node_at(&root, &segments).cloned())
    }

    async fn write(&self, path: &DocumentPath, value: Value) -> Result<(), DocumentStoreError> {
        let mut root = self.lock_root()?;
        let segments: Vec<&str> = path.segments().collect();
        set_node(&mut root, &segments, normalise(value));
        Ok(())
    }

    async fn merge(
        &self,
        path: &DocumentPath,
        partial: Map<String, Value>,
    ) -> Result<(), DocumentStoreError> {
        let children = partial
            .into_iter()
            .map(|(key, value)| {
                path.child(&key)
                    .map(|child| (child, value))
                    .map_err(|err| DocumentStoreError::rejected(err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut root = self.lock_root()?;
        for (child, value) in children {
            let segments: Vec<&str> = child.segments().collect();
            set_node(&mut root, &segments, normalise(value));
        }
        Ok(())
    }

    async fn append_child(&self, _path: &DocumentPath) -> Result<String, DocumentStoreError> {
        Ok(self.keys.next_key())
    }
}

fn node_at<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .filter(|item| !item.is_null()),
        _ => None,
    })
}

/// Place `value` at `segments`, or remove the node when `value` is `None`.
///
/// Intermediate scalars are replaced by objects; parents left empty by a
/// removal are pruned.
fn set_node(node: &mut Value, segments: &[&str], value: Option<Value>) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value.unwrap_or_else(|| Value::Object(Map::new()));
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        match value {
            Some(value) => {
                map.insert((*first).to_owned(), value);
            }
            None => {
                map.remove(*first);
            }
        }
        return;
    }

    let child = map
        .entry((*first).to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    set_node(child, rest, value);
    if is_empty_container(child) {
        map.remove(*first);
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Drop `null`s and empty containers, recursively.
fn normalise(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, child)| normalise(child).map(|child| (key, child)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items
                .into_iter()
                .map(|item| normalise(item).unwrap_or(Value::Null))
                .collect();
            kept.iter()
                .any(|item| !item.is_null())
                .then_some(Value::Array(kept))
        }
        scalar => Some(scalar),
    }
}
