use crate::collection::CollectionHandle;
use crate::common::{DOC_ID_FIELD, PATH_SEPARATOR};
use crate::document::Document;
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::MockStore;
use crate::value::Value;

/// A handle bound to one document slot within a collection.
///
/// The reference identifies a slot by collection name and document id; the
/// slot may or may not hold a document. Reads never fail on absence —
/// [DocumentRef::get] reports existence through the snapshot instead.
#[derive(Clone)]
pub struct DocumentRef {
    store: MockStore,
    collection: String,
    id: String,
}

impl DocumentRef {
    pub(crate) fn new(store: MockStore, collection: &str, id: &str) -> Self {
        DocumentRef {
            store,
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// The document id this reference is bound to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads the current document.
    ///
    /// Never errors: an absent document yields a snapshot with
    /// `exists() == false` and no data.
    pub fn get(&self) -> StoreResult<DocumentSnapshot> {
        let document = self
            .store
            .read_collection(&self.collection, |data| data.get(&self.id).cloned());
        Ok(DocumentSnapshot::new(document, &self.id))
    }

    /// Fully replaces the document's fields, creating the document if it
    /// does not exist. The document id is stamped into the fields under
    /// `"id"` and never changes once assigned.
    pub fn set(&self, mut document: Document) -> StoreResult<()> {
        document.put(DOC_ID_FIELD, self.id.as_str())?;
        self.store.write_collection(&self.collection, |data| {
            data.insert(self.id.clone(), document);
        });
        Ok(())
    }

    /// Shallow-merges `partial` into the existing document.
    ///
    /// Top-level keys in `partial` overwrite prior values; all other keys
    /// are preserved. Dotted keys are stored literally rather than applied
    /// as nested updates (see [Document::merge]).
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::NotFound] if the document does not exist.
    /// Updating a missing document is an error, never a silent create.
    pub fn update(&self, partial: Document) -> StoreResult<()> {
        self.store.write_collection(&self.collection, |data| {
            match data.get_mut(&self.id) {
                Some(existing) => {
                    existing.merge(&partial);
                    Ok(())
                }
                None => {
                    log::error!(
                        "Document '{}' not found in collection '{}'",
                        self.id,
                        self.collection
                    );
                    Err(StoreError::new(
                        &format!("Document {} not found", self.id),
                        ErrorKind::NotFound,
                    ))
                }
            }
        })
    }

    /// Deletes the document if present. Deleting an absent document is a
    /// no-op; the slot is removed entirely, with no tombstone left behind.
    pub fn delete(&self) -> StoreResult<()> {
        self.store.write_collection(&self.collection, |data| {
            data.shift_remove(&self.id);
        });
        Ok(())
    }

    /// Returns a handle to a sub-collection of this document.
    ///
    /// Sub-collections are emulated as top-level collections with the
    /// synthetic name `parent/docId/sub`.
    pub fn collection(&self, sub: &str) -> CollectionHandle {
        let path = format!(
            "{}{sep}{}{sep}{}",
            self.collection,
            self.id,
            sub,
            sep = PATH_SEPARATOR
        );
        self.store.collection(&path)
    }
}

/// The result of reading a document slot: the fields if present, the id,
/// and an existence flag.
#[derive(Clone, Debug)]
pub struct DocumentSnapshot {
    document: Option<Document>,
    id: String,
    exists: bool,
}

impl DocumentSnapshot {
    pub(crate) fn new(document: Option<Document>, id: &str) -> Self {
        let exists = document.is_some();
        DocumentSnapshot {
            document,
            id: id.to_string(),
            exists,
        }
    }

    /// The document's fields, or `None` if the slot was empty at read time.
    pub fn data(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// The id of the slot this snapshot was read from.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the document existed at read time.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Convenience field access: resolves a (possibly dotted) field path
    /// against the snapshot, yielding [Value::Null] when the document is
    /// absent or the path does not resolve.
    pub fn field(&self, path: &str) -> Value {
        match &self.document {
            Some(document) => document.get(path),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn store_with_user() -> MockStore {
        let store = MockStore::new();
        store
            .collection("users")
            .doc("user_1")
            .set(doc! { name: "Alice", isPremium: false })
            .unwrap();
        store
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let store = store_with_user();
        let snapshot = store.collection("users").doc("user_1").get().unwrap();
        assert!(snapshot.exists());
        assert_eq!(snapshot.id(), "user_1");
        let data = snapshot.data().unwrap();
        assert_eq!(data.get("name"), Value::from("Alice"));
        assert_eq!(data.get("id"), Value::from("user_1"));
    }

    #[test]
    fn test_set_replaces_fully() {
        let store = store_with_user();
        let doc_ref = store.collection("users").doc("user_1");
        doc_ref.set(doc! { email: "a@b.c" }).unwrap();
        let data = doc_ref.get().unwrap().data().unwrap().clone();
        assert_eq!(data.get("email"), Value::from("a@b.c"));
        // full replace: the old field is gone, the id survives
        assert_eq!(data.get("name"), Value::Null);
        assert_eq!(data.get("id"), Value::from("user_1"));
    }

    #[test]
    fn test_update_merges_top_level() {
        let store = store_with_user();
        let doc_ref = store.collection("users").doc("user_1");
        doc_ref.update(doc! { isPremium: true }).unwrap();
        let data = doc_ref.get().unwrap().data().unwrap().clone();
        assert_eq!(data.get("isPremium"), Value::Bool(true));
        assert_eq!(data.get("name"), Value::from("Alice"));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = MockStore::new();
        let err = store
            .collection("users")
            .doc("ghost")
            .update(doc! { x: 1 })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
        // the error did not create the document
        assert!(!store.collection("users").doc("ghost").get().unwrap().exists());
    }

    #[test]
    fn test_delete_then_get_is_absent() {
        let store = store_with_user();
        let doc_ref = store.collection("users").doc("user_1");
        doc_ref.delete().unwrap();
        let snapshot = doc_ref.get().unwrap();
        assert!(!snapshot.exists());
        assert!(snapshot.data().is_none());
        // deleting again is a silent no-op
        doc_ref.delete().unwrap();
    }

    #[test]
    fn test_subcollection_path() {
        let store = MockStore::new();
        let messages = store.collection("chats").doc("chat_1").collection("messages");
        assert_eq!(messages.name(), "chats/chat_1/messages");
        messages.add(doc! { text: "hi" }).unwrap();
        assert!(store
            .collection_names()
            .contains(&"chats/chat_1/messages".to_string()));
        assert_eq!(messages.size(), 1);
    }

    #[test]
    fn test_snapshot_field_helper() {
        let store = store_with_user();
        let snapshot = store.collection("users").doc("user_1").get().unwrap();
        assert_eq!(snapshot.field("name"), Value::from("Alice"));
        let missing = store.collection("users").doc("ghost").get().unwrap();
        assert_eq!(missing.field("name"), Value::Null);
    }
}
