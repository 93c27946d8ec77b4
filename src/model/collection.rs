//! Shared collection nodes: sequences (arrays and lists) and maps.
//!
//! Both are `Arc<RwLock<_>>` handles. A `SeqRef` backs `Value::Array` and
//! `Value::List`; the difference is growth: lists grow in place, arrays are
//! reallocated (see [`adjust_size`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{TypeTag, Value};

// ============================================================================
// Sequence
// ============================================================================

/// Ordered elements with a declared element type.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub element_type: TypeTag,
    pub items: Vec<Value>,
}

/// Shared handle to a [`Sequence`].
#[derive(Debug, Clone)]
pub struct SeqRef(Arc<RwLock<Sequence>>);

impl SeqRef {
    pub fn new(element_type: TypeTag, items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(Sequence { element_type, items })))
    }

    pub fn empty(element_type: TypeTag) -> Self {
        Self::new(element_type, Vec::new())
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Sequence> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Sequence> {
        self.0.write()
    }

    pub fn len(&self) -> usize {
        self.0.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> TypeTag {
        self.0.read().element_type.clone()
    }

    /// Element at `index`; `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().items.get(index).cloned()
    }

    /// Replace the element at `index`. Returns `false` when out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.write().items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.0.write().items.push(value);
    }

    /// Snapshot of the current elements.
    pub fn items(&self) -> Vec<Value> {
        self.0.read().items.clone()
    }

    /// Pad with `Null` until `index` is addressable. Never shrinks.
    pub fn pad_to(&self, index: usize) {
        let mut seq = self.0.write();
        if seq.items.len() <= index {
            seq.items.resize(index + 1, Value::Null);
        }
    }

    pub fn ptr_eq(&self, other: &SeqRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SeqRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

// ============================================================================
// Map
// ============================================================================

/// String-keyed entries with a declared value type. Keys iterate in sorted
/// order so wildcard reads are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub value_type: TypeTag,
    pub entries: BTreeMap<String, Value>,
}

/// Shared handle to a [`MapNode`].
#[derive(Debug, Clone)]
pub struct MapRef(Arc<RwLock<MapNode>>);

impl MapRef {
    pub fn new(value_type: TypeTag) -> Self {
        Self(Arc::new(RwLock::new(MapNode { value_type, entries: BTreeMap::new() })))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, MapNode> {
        self.0.read()
    }

    pub fn len(&self) -> usize {
        self.0.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_type(&self) -> TypeTag {
        self.0.read().value_type.clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().entries.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().entries.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().entries.contains_key(key)
    }

    /// Snapshot of the current entries in key order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .read()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for MapRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

// ============================================================================
// Growth
// ============================================================================

/// Make `index` addressable in an array or list.
///
/// - List: padded with `Null` in place; the same handle is returned.
/// - Array: when too short, a new node of length `index + 1` is allocated with
///   the existing elements copied over; the caller must store the returned
///   handle back into the owner.
///
/// Existing elements are never moved or overwritten and nothing shrinks.
/// Returns `None` for anything that is not an array or list.
pub fn adjust_size(collection: &Value, index: usize) -> Option<Value> {
    match collection {
        Value::List(seq) => {
            seq.pad_to(index);
            Some(collection.clone())
        }
        Value::Array(seq) => {
            if index < seq.len() {
                return Some(collection.clone());
            }
            let (element_type, mut items) = {
                let guard = seq.read();
                (guard.element_type.clone(), guard.items.clone())
            };
            items.resize(index + 1, Value::Null);
            tracing::trace!(from = seq.len(), to = index + 1, "reallocating array");
            Some(Value::Array(SeqRef::new(element_type, items)))
        }
        _ => None,
    }
}
