use crate::common::SortOrder;
use crate::document::Document;
use crate::document_ref::DocumentSnapshot;
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::MockStore;
use crate::value::Value;

/// Filter operators supported by the query builder.
///
/// These mirror the subset of the managed backend's operators the
/// application actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Keep documents whose resolved field equals the predicate value.
    EqualTo,
    /// Keep documents whose resolved field is an array containing the
    /// predicate value. An absent field behaves as an empty array.
    ArrayContains,
    /// Keep documents whose resolved field is truthy and strictly greater
    /// than the predicate value.
    GreaterThan,
    /// Drop documents whose resolved field is a member of the predicate
    /// array.
    NotIn,
}

#[derive(Debug, Clone)]
struct WhereClause {
    field: String,
    op: FilterOp,
    value: Value,
}

#[derive(Debug, Clone)]
struct OrderClause {
    field: String,
    order: SortOrder,
}

/// An immutable query over one collection.
///
/// A query accumulates filter predicates, an ordering list, and an
/// optional result cap. Each refinement (`where_field` / `order_by` /
/// `limit`) returns a new query layering onto the prior one; the original
/// is never mutated. Evaluation is deferred until [Query::get] is called.
///
/// Ordering clauses are accepted for call-site compatibility but never
/// applied to the result sequence; callers that depend on sorted results
/// must not rely on this emulator. Results come back in the collection's
/// insertion order.
#[derive(Clone)]
pub struct Query {
    store: MockStore,
    collection: String,
    clauses: Vec<WhereClause>,
    ordering: Vec<OrderClause>,
    cap: Option<usize>,
}

impl Query {
    pub(crate) fn new(store: MockStore, collection: &str) -> Self {
        Query {
            store,
            collection: collection.to_string(),
            clauses: Vec::new(),
            ordering: Vec::new(),
            cap: None,
        }
    }

    /// Returns a new query with an additional filter predicate. All
    /// predicates must hold for a document to be kept (logical AND).
    pub fn where_field<T: Into<Value>>(&self, field: &str, op: FilterOp, value: T) -> Query {
        let mut next = self.clone();
        next.clauses.push(WhereClause {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        next
    }

    /// Returns a new query with an additional ordering clause.
    ///
    /// The clause is recorded but not enforced; see the type-level note.
    pub fn order_by(&self, field: &str, order: SortOrder) -> Query {
        let mut next = self.clone();
        next.ordering.push(OrderClause {
            field: field.to_string(),
            order,
        });
        next
    }

    /// Returns a new query capped at `count` results. The cap truncates to
    /// the first `count` matches in insertion order.
    pub fn limit(&self, count: usize) -> Query {
        let mut next = self.clone();
        next.cap = Some(count);
        next
    }

    /// Evaluates the query against the current collection snapshot.
    ///
    /// The result is fully materialized at evaluation time; later writes
    /// to the collection do not change an already-returned snapshot.
    pub fn get(&self) -> StoreResult<QuerySnapshot> {
        if !self.ordering.is_empty() {
            log::debug!(
                "Query on '{}' carries {} ordering clause(s); ordering is not applied by the emulator",
                self.collection,
                self.ordering.len()
            );
        }

        let matches = self.store.read_collection(&self.collection, |data| {
            let mut matched: Vec<DocumentSnapshot> = Vec::new();
            for (id, document) in data.iter() {
                if self.matches(document)? {
                    matched.push(DocumentSnapshot::new(Some(document.clone()), id));
                    if let Some(cap) = self.cap {
                        if matched.len() >= cap {
                            break;
                        }
                    }
                }
            }
            Ok::<_, StoreError>(matched)
        })?;

        Ok(QuerySnapshot::new(matches))
    }

    fn matches(&self, document: &Document) -> StoreResult<bool> {
        for clause in &self.clauses {
            let resolved = document.get(&clause.field);
            let keep = match clause.op {
                FilterOp::EqualTo => resolved == clause.value,
                FilterOp::ArrayContains => match resolved.as_array() {
                    Some(items) => items.contains(&clause.value),
                    // absent field behaves as an empty array
                    None => false,
                },
                FilterOp::GreaterThan => {
                    resolved.is_truthy()
                        && resolved.partial_cmp(&clause.value) == Some(std::cmp::Ordering::Greater)
                }
                FilterOp::NotIn => match clause.value.as_array() {
                    Some(excluded) => !excluded.contains(&resolved),
                    None => {
                        log::error!(
                            "not-in filter on field '{}' requires an array value",
                            clause.field
                        );
                        return Err(StoreError::new(
                            &format!(
                                "not-in filter on field '{}' requires an array value",
                                clause.field
                            ),
                            ErrorKind::InvalidDataType,
                        ));
                    }
                },
            };
            if !keep {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// The materialized result of a query: the matched documents plus
/// cardinality and emptiness flags, computed eagerly at evaluation time.
#[derive(Clone, Debug)]
pub struct QuerySnapshot {
    docs: Vec<DocumentSnapshot>,
    size: usize,
    empty: bool,
}

impl QuerySnapshot {
    fn new(docs: Vec<DocumentSnapshot>) -> Self {
        let size = docs.len();
        QuerySnapshot {
            docs,
            size,
            empty: size == 0,
        }
    }

    /// The matched documents, in the collection's insertion order.
    pub fn docs(&self) -> &[DocumentSnapshot] {
        &self.docs
    }

    /// The number of matched documents.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether no document matched.
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

impl<'a> IntoIterator for &'a QuerySnapshot {
    type Item = &'a DocumentSnapshot;
    type IntoIter = std::slice::Iter<'a, DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn seeded_store() -> MockStore {
        let store = MockStore::new();
        let users = store.collection("users");
        users
            .doc("u1")
            .set(doc! {
                email: "user1@safetalk.com",
                age: 30,
                blockedUsers: ["u9"],
                stats: { totalRatings: 10 }
            })
            .unwrap();
        users
            .doc("u2")
            .set(doc! {
                email: "user2@safetalk.com",
                age: 25,
                blockedUsers: []
            })
            .unwrap();
        users
            .doc("u3")
            .set(doc! {
                email: "user3@safetalk.com",
                age: 35
            })
            .unwrap();
        store
    }

    #[test]
    fn test_equality_filter() {
        let store = seeded_store();
        let result = store
            .collection("users")
            .where_field("email", FilterOp::EqualTo, "user1@safetalk.com")
            .get()
            .unwrap();
        assert_eq!(result.size(), 1);
        assert_eq!(result.docs()[0].id(), "u1");

        let none = store
            .collection("users")
            .where_field("email", FilterOp::EqualTo, "nobody@safetalk.com")
            .get()
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(none.size(), 0);
    }

    #[test]
    fn test_nested_path_equality() {
        let store = seeded_store();
        let result = store
            .collection("users")
            .where_field("stats.totalRatings", FilterOp::EqualTo, 10)
            .get()
            .unwrap();
        assert_eq!(result.size(), 1);
        assert_eq!(result.docs()[0].id(), "u1");
    }

    #[test]
    fn test_array_contains() {
        let store = seeded_store();
        let result = store
            .collection("users")
            .where_field("blockedUsers", FilterOp::ArrayContains, "u9")
            .get()
            .unwrap();
        assert_eq!(result.size(), 1);
        assert_eq!(result.docs()[0].id(), "u1");
    }

    #[test]
    fn test_array_contains_absent_field_excludes() {
        let store = seeded_store();
        // u3 has no blockedUsers field; absent behaves as the empty array
        let result = store
            .collection("users")
            .where_field("blockedUsers", FilterOp::ArrayContains, "u3")
            .get()
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_greater_than() {
        let store = seeded_store();
        let result = store
            .collection("users")
            .where_field("age", FilterOp::GreaterThan, 28)
            .get()
            .unwrap();
        let ids: Vec<&str> = result.docs().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["u1", "u3"]);
    }

    #[test]
    fn test_greater_than_skips_absent_and_falsy() {
        let store = MockStore::new();
        let items = store.collection("items");
        items.doc("a").set(doc! { count: 0 }).unwrap();
        items.doc("b").set(doc! { other: 1 }).unwrap();
        let result = items
            .where_field("count", FilterOp::GreaterThan, -1)
            .get()
            .unwrap();
        // zero is falsy and the absent field resolves to null
        assert!(result.is_empty());
    }

    #[test]
    fn test_not_in() {
        let store = seeded_store();
        let excluded = Value::from(vec!["user1@safetalk.com", "user2@safetalk.com"]);
        let result = store
            .collection("users")
            .where_field("email", FilterOp::NotIn, excluded)
            .get()
            .unwrap();
        assert_eq!(result.size(), 1);
        assert_eq!(result.docs()[0].id(), "u3");
    }

    #[test]
    fn test_not_in_requires_array() {
        let store = seeded_store();
        let err = store
            .collection("users")
            .where_field("email", FilterOp::NotIn, "not-an-array")
            .get()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidDataType);
    }

    #[test]
    fn test_clauses_are_anded() {
        let store = seeded_store();
        let result = store
            .collection("users")
            .where_field("age", FilterOp::GreaterThan, 20)
            .where_field("email", FilterOp::EqualTo, "user2@safetalk.com")
            .get()
            .unwrap();
        assert_eq!(result.size(), 1);
        assert_eq!(result.docs()[0].id(), "u2");
    }

    #[test]
    fn test_limit_truncates() {
        let store = seeded_store();
        let capped = store.collection("users").limit(2).get().unwrap();
        assert_eq!(capped.size(), 2);
        assert_eq!(capped.docs()[0].id(), "u1");
        assert_eq!(capped.docs()[1].id(), "u2");

        // a cap larger than the match count yields all matches
        let generous = store.collection("users").limit(10).get().unwrap();
        assert_eq!(generous.size(), 3);
    }

    #[test]
    fn test_builder_is_immutable() {
        let store = seeded_store();
        let base = store
            .collection("users")
            .where_field("age", FilterOp::GreaterThan, 20);
        let refined = base.where_field("email", FilterOp::EqualTo, "user1@safetalk.com");
        // refining did not mutate the base query
        assert_eq!(base.get().unwrap().size(), 3);
        assert_eq!(refined.get().unwrap().size(), 1);
    }

    #[test]
    fn test_ordering_accepted_but_not_applied() {
        let store = seeded_store();
        let result = store
            .collection("users")
            .order_by("age", SortOrder::Descending)
            .get()
            .unwrap();
        // insertion order, not age order
        let ids: Vec<&str> = result.docs().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_snapshot_is_materialized() {
        let store = seeded_store();
        let result = store.collection("users").limit(10).get().unwrap();
        assert_eq!(result.size(), 3);
        store.collection("users").doc("u4").set(doc! {}).unwrap();
        // the snapshot does not see the later write
        assert_eq!(result.size(), 3);
    }

    #[test]
    fn test_equality_independent_of_insertion_order() {
        let store = MockStore::new();
        let users = store.collection("users");
        for id in ["c", "a", "b"] {
            users
                .doc(id)
                .set(doc! { group: (if id == "b" { "x" } else { "y" }) })
                .unwrap();
        }
        let result = users.where_field("group", FilterOp::EqualTo, "x").get().unwrap();
        assert_eq!(result.size(), 1);
        assert_eq!(result.docs()[0].id(), "b");
    }
}
