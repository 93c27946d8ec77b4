//! # Object Graph Model
//!
//! The dynamic object graphs the engine reads from and writes into, plus the
//! field descriptors that cross every boundary: reader ↔ writer ↔ strategies
//! ↔ caller.
//!
//! | Type | Role |
//! |------|------|
//! | [`Value`] | any node of a graph: scalar, temporal, container or object |
//! | [`ObjectRef`] / [`SeqRef`] / [`MapRef`] | shared `Arc<RwLock<_>>` node handles |
//! | [`TypeTag`] / [`FieldType`] | declared types and the flat conversion key |
//! | [`Field`] / [`FieldGroup`] | values bound to paths |
//!
//! Design rule: no accessor lookup and no conversion here. This module is
//! pure data.

pub mod type_tag;
pub mod value;
pub mod object;
pub mod collection;
pub mod field;
pub mod property_map;

pub use type_tag::{FieldType, PrimitiveKind, TypeTag};
pub use value::Value;
pub use object::{Object, ObjectRef};
pub use collection::{adjust_size, MapNode, MapRef, SeqRef, Sequence};
pub use field::{Extracted, Field, FieldGroup};
pub use property_map::PropertyMap;
