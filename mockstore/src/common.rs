use std::sync::Arc;

use parking_lot::RwLock;

/// Field under which the emulator stamps a document's own identifier,
/// mirroring the managed backend client which exposes the id alongside
/// the stored fields.
pub const DOC_ID_FIELD: &str = "id";

/// Separator used to build synthetic sub-collection names
/// (`parent/docId/sub`).
pub const PATH_SEPARATOR: char = '/';

/// Separator used for nested field lookup in documents and queries.
pub const FIELD_SEPARATOR: char = '.';

pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

pub trait ReadExecutor<T: ?Sized> {
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

impl<T> ReadExecutor<T> for Atomic<T> {
    #[inline]
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let read_guard = self.read();
        f(&*read_guard)
    }
}

pub trait WriteExecutor<T: ?Sized> {
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> WriteExecutor<T> for Atomic<T> {
    #[inline]
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut write_guard = self.write();
        f(&mut *write_guard)
    }
}

/// Specifies the direction for sorting documents.
///
/// Accepted by the query builder for interface parity with the real
/// backend client. The emulator records ordering clauses but never
/// applies them; see [`crate::query::Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}
