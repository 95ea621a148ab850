use indexmap::IndexMap;

use crate::collection::CollectionHandle;
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::document::Document;

/// Map of document id to document, in insertion order.
pub(crate) type CollectionData = IndexMap<String, Document>;

/// In-memory stand-in for the managed backend's document database.
///
/// The store owns every collection for its lifetime. It is an explicitly
/// constructed value with no process-wide global: each test driver builds
/// its own store, which keeps runs isolated and lets tests execute in
/// parallel.
///
/// Collections are mapped by name. Synthetic hierarchical names of the
/// form `parent/docId/sub` emulate the backend's nested sub-collections;
/// they live in the same flat namespace as top-level collections.
///
/// `MockStore` is a cheap clonable handle: all clones share the same
/// underlying state.
///
/// # Examples
///
/// ```rust,ignore
/// use mockstore::{MockStore, doc};
///
/// let store = MockStore::new();
/// let users = store.collection("users");
/// users.doc("user_1").set(doc! { name: "Alice" })?;
/// ```
#[derive(Clone, Default)]
pub struct MockStore {
    collections: Atomic<IndexMap<String, CollectionData>>,
}

impl MockStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        MockStore {
            collections: atomic(IndexMap::new()),
        }
    }

    /// Returns a handle to the named collection, creating an empty one on
    /// first reference. Never fails.
    pub fn collection(&self, name: &str) -> CollectionHandle {
        self.collections.write_with(|collections| {
            if !collections.contains_key(name) {
                log::debug!("Creating collection '{}'", name);
                collections.insert(name.to_string(), CollectionData::new());
            }
        });
        CollectionHandle::new(self.clone(), name)
    }

    /// Returns the names of all collections referenced so far, including
    /// synthetic sub-collection names, in creation order.
    pub fn collection_names(&self) -> Vec<String> {
        self.collections
            .read_with(|collections| collections.keys().cloned().collect())
    }

    /// Drops every collection. Used between test scenarios that need a
    /// pristine store without building a new one.
    pub fn clear(&self) {
        self.collections.write_with(|collections| collections.clear());
    }

    /// Runs `f` against the named collection's data under a read lock.
    /// A collection that was never referenced reads as empty.
    pub(crate) fn read_collection<R>(&self, name: &str, f: impl FnOnce(&CollectionData) -> R) -> R {
        self.collections
            .read_with(|collections| match collections.get(name) {
                Some(data) => f(data),
                None => f(&CollectionData::new()),
            })
    }

    /// Runs `f` against the named collection's data under a write lock,
    /// creating the collection if it does not exist yet.
    pub(crate) fn write_collection<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut CollectionData) -> R,
    ) -> R {
        self.collections.write_with(|collections| {
            f(collections.entry(name.to_string()).or_default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_collection_created_on_first_reference() {
        let store = MockStore::new();
        assert!(store.collection_names().is_empty());
        store.collection("users");
        assert_eq!(store.collection_names(), vec!["users"]);
        // referencing again does not duplicate
        store.collection("users");
        assert_eq!(store.collection_names(), vec!["users"]);
    }

    #[test]
    fn test_clones_share_state() {
        let store = MockStore::new();
        let other = store.clone();
        store
            .collection("users")
            .doc("u1")
            .set(doc! { name: "Alice" })
            .unwrap();
        let snapshot = other.collection("users").doc("u1").get().unwrap();
        assert!(snapshot.exists());
    }

    #[test]
    fn test_clear() {
        let store = MockStore::new();
        store
            .collection("users")
            .doc("u1")
            .set(doc! { name: "Alice" })
            .unwrap();
        store.clear();
        assert!(store.collection_names().is_empty());
        let snapshot = store.collection("users").doc("u1").get().unwrap();
        assert!(!snapshot.exists());
    }
}
