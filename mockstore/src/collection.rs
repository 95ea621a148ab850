use uuid::Uuid;

use crate::common::SortOrder;
use crate::document::Document;
use crate::document_ref::DocumentRef;
use crate::errors::StoreResult;
use crate::query::{FilterOp, Query};
use crate::store::MockStore;
use crate::value::Value;

/// A handle bound to one named collection in a [MockStore].
///
/// The handle supports direct document lookup by id, insertion with a
/// generated id, and query construction. Obtaining a handle never implies
/// the collection holds any documents.
#[derive(Clone)]
pub struct CollectionHandle {
    store: MockStore,
    name: String,
}

impl CollectionHandle {
    pub(crate) fn new(store: MockStore, name: &str) -> Self {
        CollectionHandle {
            store,
            name: name.to_string(),
        }
    }

    /// Returns the collection's name (a synthetic `parent/docId/sub` path
    /// for sub-collections).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a reference to the document with the given id.
    ///
    /// Always succeeds; it does not imply the document exists.
    pub fn doc(&self, id: &str) -> DocumentRef {
        DocumentRef::new(self.store.clone(), &self.name, id)
    }

    /// Stores `document` under a freshly generated unique id and returns a
    /// reference exposing that id.
    ///
    /// The id is a random version-4 UUID, which guarantees uniqueness
    /// across collections and stores. The id is also stamped into the
    /// stored fields under `"id"`.
    pub fn add(&self, document: Document) -> StoreResult<DocumentRef> {
        let id = Uuid::new_v4().to_string();
        let doc_ref = self.doc(&id);
        doc_ref.set(document)?;
        log::debug!("Added document '{}' to collection '{}'", id, self.name);
        Ok(doc_ref)
    }

    /// Starts a query constrained by a filter predicate.
    pub fn where_field<T: Into<Value>>(&self, field: &str, op: FilterOp, value: T) -> Query {
        Query::new(self.store.clone(), &self.name).where_field(field, op, value)
    }

    /// Starts a query with an ordering clause.
    ///
    /// Ordering is recorded for interface parity but never applied; see
    /// [`Query::order_by`].
    pub fn order_by(&self, field: &str, order: SortOrder) -> Query {
        Query::new(self.store.clone(), &self.name).order_by(field, order)
    }

    /// Starts a query capped at `count` results.
    pub fn limit(&self, count: usize) -> Query {
        Query::new(self.store.clone(), &self.name).limit(count)
    }

    /// Returns the number of documents currently stored.
    pub fn size(&self) -> usize {
        self.store.read_collection(&self.name, |data| data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_add_generates_unique_ids() {
        let store = MockStore::new();
        let chats = store.collection("chats");
        let first = chats.add(doc! { isActive: true }).unwrap();
        let second = chats.add(doc! { isActive: true }).unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(chats.size(), 2);
    }

    #[test]
    fn test_add_stamps_id_field() {
        let store = MockStore::new();
        let chats = store.collection("chats");
        let doc_ref = chats.add(doc! { messageCount: 0 }).unwrap();
        let snapshot = chats.doc(doc_ref.id()).get().unwrap();
        let stored = snapshot.data().unwrap();
        assert_eq!(stored.get("id"), Value::from(doc_ref.id()));
    }

    #[test]
    fn test_doc_does_not_imply_existence() {
        let store = MockStore::new();
        let users = store.collection("users");
        let snapshot = users.doc("ghost").get().unwrap();
        assert!(!snapshot.exists());
        assert!(snapshot.data().is_none());
        assert_eq!(users.size(), 0);
    }
}
