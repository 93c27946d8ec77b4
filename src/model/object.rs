//! Object instances of registered types.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Value;

/// An instance of a type registered in the `TypeRegistry`.
///
/// `members` is the raw storage that direct-member access and the default
/// member-backed accessors read and write.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub type_name: String,
    pub members: HashMap<String, Value>,
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), members: HashMap::new() }
    }

    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    pub fn member(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    pub fn set_member(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.members.insert(name.into(), value)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }
}

/// Shared handle to an [`Object`].
#[derive(Debug, Clone)]
pub struct ObjectRef(Arc<RwLock<Object>>);

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.0.write()
    }

    pub fn type_name(&self) -> String {
        self.0.read().type_name.clone()
    }

    /// Raw member value, bypassing accessors.
    pub fn member(&self, name: &str) -> Option<Value> {
        self.0.read().members.get(name).cloned()
    }

    pub fn set_member(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().set_member(name, value)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Object> for ObjectRef {
    fn from(object: Object) -> Self {
        ObjectRef::new(object)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_aliases() {
        let obj = ObjectRef::new(Object::new("Address"));
        let alias = obj.clone();
        alias.set_member("city", Value::from("Oslo"));
        assert_eq!(obj.member("city"), Some(Value::from("Oslo")));
        assert!(obj.ptr_eq(&alias));
    }

    #[test]
    fn test_with_member() {
        let obj = Object::new("Order").with_member("id", 7);
        assert_eq!(obj.member("id"), Some(&Value::Int(7)));
        assert!(!obj.has_member("missing"));
    }
}
