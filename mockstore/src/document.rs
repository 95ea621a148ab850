use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};

use crate::common::{DOC_ID_FIELD, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::value::Value;

/// Represents a document in the mock store.
///
/// A document is composed of key-value pairs. The key is always a [String]
/// and the value is a [Value]. Fields keep their insertion order, so
/// iteration and query results are deterministic.
///
/// Nested documents are read through dot-separated paths: for a document
/// `{"stats": {"totalChats": 1}}`, `document.get("stats.totalChats")`
/// returns the nested value. Writes are shallow only: `put` stores a dotted
/// key literally as a top-level field instead of descending into the nested
/// document. This mirrors the emulator's known divergence from the real
/// backend, which supports dotted-path updates server-side.
///
/// The field `id` is stamped by the store with the document's own
/// identifier when the document is written through a handle.
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Checks if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of top-level fields.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key.
    ///
    /// If the key already exists its value is replaced. The key is stored
    /// literally; a dotted key such as `"stats.averageRating"` becomes a
    /// top-level field with a dot in its name rather than a nested update.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> StoreResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }
        self.data.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Returns the [Value] associated with the key, or [Value::Null] if
    /// this document contains no mapping for it.
    ///
    /// A key containing the field separator is resolved by descending into
    /// nested documents segment by segment; if any segment is missing or is
    /// not a document, the result is [Value::Null]. A dotted key never
    /// matches a literal top-level field of the same name.
    pub fn get(&self, key: &str) -> Value {
        if key.contains(FIELD_SEPARATOR) {
            self.deep_get(key)
        } else {
            self.data.get(key).cloned().unwrap_or(Value::Null)
        }
    }

    fn deep_get(&self, key: &str) -> Value {
        let mut current = Value::Document(self.clone());
        for segment in key.split(FIELD_SEPARATOR) {
            match current {
                Value::Document(doc) => match doc.data.get(segment) {
                    Some(value) => current = value.clone(),
                    None => return Value::Null,
                },
                _ => return Value::Null,
            }
        }
        current
    }

    /// Checks whether a top-level field with the given name exists.
    pub fn contains_field(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes a top-level field, returning its previous value if present.
    ///
    /// Preserves the insertion order of the remaining fields.
    pub fn remove_field(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Shallow-merges the fields of `other` into this document.
    ///
    /// Top-level keys present in `other` overwrite prior values; keys
    /// absent from `other` are preserved. Nested documents are replaced
    /// wholesale, not merged recursively.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Returns the document's stamped identifier, if one has been written.
    pub fn id(&self) -> Option<&str> {
        match self.data.get(DOC_ID_FIELD) {
            Some(Value::String(id)) => Some(id),
            _ => None,
        }
    }

    /// Iterates over top-level fields in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Returns the top-level field names in insertion order.
    pub fn fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Strips the quotes `stringify!` leaves around string-literal keys.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use mockstore::doc;
///
/// // Empty document
/// let empty = doc! {};
///
/// // Simple key-value pairs
/// let simple = doc! {
///     name: "Alice",
///     age: 30
/// };
///
/// // Nested documents and arrays
/// let complex = doc! {
///     user: {
///         name: "Charlie",
///         tags: ["admin", "user"]
///     },
///     values: [1, 2, 3]
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::Document::new()
    };

    ({}) => {
        $crate::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::Document::new();
            $(
                doc.put(&$crate::document::normalize(stringify!($key)), $crate::doc_value!($value))
                    .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::Value::Document($crate::doc!{ $($key : $value),* })
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // match an expression (variable, function call, literal, etc.)
    ($value:expr) => {
        $crate::Value::from($value)
    };
}
