//! # Mockstore - In-Memory Document Store Emulator
//!
//! Mockstore is a small in-memory stand-in for a managed document database
//! (hierarchical collections of field-mapped documents), built to exercise
//! application business logic in tests without the real backend.
//!
//! ## Key Features
//!
//! - **Explicit store value**: No ambient global; each test driver owns its
//!   store, enabling isolated and parallel runs
//! - **Collections and documents**: Direct lookup, generated ids,
//!   sub-collections via synthetic hierarchical names
//! - **Queries**: Immutable builder with equality, array-containment,
//!   greater-than, and exclusion predicates, plus a result cap
//! - **Deterministic iteration**: Insertion-ordered maps throughout
//!
//! ## Fidelity Gaps
//!
//! The emulator approximates the real backend only as far as the harness
//! scenarios require. Known, deliberate divergences:
//!
//! - Server-side field transforms (increment, array-union) are stored as
//!   literal marker strings and never executed ([field_value])
//! - Document updates are shallow: dotted keys are stored literally instead
//!   of applied as nested updates ([Document::merge])
//! - Query ordering clauses are recorded but never applied
//!   ([query::Query::order_by])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mockstore::{doc, FilterOp, MockStore};
//!
//! let store = MockStore::new();
//! let users = store.collection("users");
//! users.doc("user_1").set(doc! { email: "user1@safetalk.com" })?;
//!
//! let result = users
//!     .where_field("email", FilterOp::EqualTo, "user1@safetalk.com")
//!     .get()?;
//! assert_eq!(result.size(), 1);
//! ```

pub mod collection;
pub mod common;
pub mod document;
pub mod document_ref;
pub mod errors;
pub mod query;
pub mod store;
pub mod value;

pub use collection::CollectionHandle;
pub use common::SortOrder;
pub use document::Document;
pub use document_ref::{DocumentRef, DocumentSnapshot};
pub use errors::{ErrorKind, StoreError, StoreResult};
pub use query::{FilterOp, Query, QuerySnapshot};
pub use store::MockStore;
pub use value::{field_value, Value};
