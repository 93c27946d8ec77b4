//! # Accessors
//!
//! Typed objects are navigated through explicitly registered accessors, not
//! reflection. The host document model registers one [`TypeDescriptor`] per
//! type name:
//!
//! | Registration | Looked up by |
//! |--------------|--------------|
//! | getter `get<Name>` / `is<Name>` | [`AccessorResolver::find_getter`] |
//! | setter `set<Name>` (overloads allowed) | [`AccessorResolver::find_setter`] |
//! | direct member | [`AccessorResolver::find_direct_member`] |
//! | ancestors, abstractness, factory | [`TypeRegistry::lineage`], [`TypeRegistry::instantiate`] |
//!
//! Lookups walk the type and then its declared ancestors, most-derived first.

pub mod registry;
pub mod resolver;

pub use registry::{Factory, TypeDescriptor, TypeRegistry};
pub use resolver::{accessor_name, AccessorResolver};

use std::fmt;
use std::sync::Arc;

use crate::model::{Object, TypeTag, Value};
use crate::Result;

// ============================================================================
// Accessor traits
// ============================================================================

/// Reads one property of an object.
pub trait Getter: Send + Sync {
    fn get(&self, target: &Object) -> Value;
}

/// Writes one property of an object.
pub trait Setter: Send + Sync {
    fn set(&self, target: &mut Object, value: Value) -> Result<()>;
}

impl<F> Getter for F
where
    F: Fn(&Object) -> Value + Send + Sync,
{
    fn get(&self, target: &Object) -> Value {
        self(target)
    }
}

impl<F> Setter for F
where
    F: Fn(&mut Object, Value) -> Result<()> + Send + Sync,
{
    fn set(&self, target: &mut Object, value: Value) -> Result<()> {
        self(target, value)
    }
}

/// Accessor backed by a raw object member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAccess {
    pub member: String,
}

impl MemberAccess {
    pub fn new(member: impl Into<String>) -> Self {
        Self { member: member.into() }
    }
}

impl Getter for MemberAccess {
    fn get(&self, target: &Object) -> Value {
        target.member(&self.member).cloned().unwrap_or(Value::Null)
    }
}

impl Setter for MemberAccess {
    fn set(&self, target: &mut Object, value: Value) -> Result<()> {
        target.set_member(self.member.clone(), value);
        Ok(())
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// A registered getter.
#[derive(Clone)]
pub struct GetterDescriptor {
    pub name: String,
    pub return_type: TypeTag,
    pub accessor: Arc<dyn Getter>,
}

/// A registered setter. One per overload.
#[derive(Clone)]
pub struct SetterDescriptor {
    pub name: String,
    pub param_type: TypeTag,
    pub accessor: Arc<dyn Setter>,
}

/// A directly addressable member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: String,
    pub declared_type: TypeTag,
}

impl fmt::Debug for GetterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}() -> {}", self.name, self.return_type)
    }
}

impl fmt::Debug for SetterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.param_type)
    }
}
