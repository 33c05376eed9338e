use std::collections::btree_map::{self, BTreeMap};
use std::slice;

use thiserror::Error;

use super::indirect::IndirectValue;
use super::key::Key;
use super::Value;

/// An ordered, immutable sequence of members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct List(Vec<IndirectValue>);

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&IndirectValue> {
        self.0.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, IndirectValue> {
        self.0.iter()
    }
}

impl From<Vec<IndirectValue>> for List {
    fn from(items: Vec<IndirectValue>) -> Self {
        List(items)
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        items.into_iter().collect()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List(iter.into_iter().map(IndirectValue::new).collect())
    }
}

impl FromIterator<IndirectValue> for List {
    fn from_iter<I: IntoIterator<Item = IndirectValue>>(iter: I) -> Self {
        List(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a IndirectValue;
    type IntoIter = slice::Iter<'a, IndirectValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Building a dictionary from entries that repeat a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate dictionary key: {0}")]
pub struct DuplicateKeyError(pub Key);

/// An immutable mapping from [`Key`] to member, iterated in canonical key
/// order.
///
/// Duplicate keys are rejected at construction rather than overwritten.
///
/// # Examples
///
/// ```
/// use bencodex::{Dictionary, Key, Value};
///
/// let dict = Dictionary::from_entries([
///     (Key::from("b"), Value::from(2i64)),
///     (Key::from(b"a".as_slice()), Value::from(1i64)),
/// ])
/// .unwrap();
///
/// let keys: Vec<_> = dict.keys().cloned().collect();
/// assert_eq!(keys, vec![Key::from(b"a".as_slice()), Key::from("b")]);
///
/// assert!(Dictionary::from_entries([
///     (Key::from("x"), Value::Null),
///     (Key::from("x"), Value::Null),
/// ])
/// .is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary(BTreeMap<Key, IndirectValue>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary, failing on the first repeated key.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, DuplicateKeyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<IndirectValue>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            match map.entry(key.into()) {
                btree_map::Entry::Occupied(entry) => {
                    return Err(DuplicateKeyError(entry.key().clone()));
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(value.into());
                }
            }
        }
        Ok(Dictionary(map))
    }

    /// Wraps a map whose keys are already unique, as the decoder produces.
    pub(crate) fn from_map(map: BTreeMap<Key, IndirectValue>) -> Self {
        Dictionary(map)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&IndirectValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> btree_map::Keys<'_, Key, IndirectValue> {
        self.0.keys()
    }

    /// Iterates entries in canonical key order.
    pub fn iter(&self) -> btree_map::Iter<'_, Key, IndirectValue> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a Key, &'a IndirectValue);
    type IntoIter = btree_map::Iter<'a, Key, IndirectValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
