//! Named values supplied from outside the object graph, such as runtime
//! properties and mapping-defined constants.

use hashbrown::HashMap;

use super::{MapRef, TypeTag, Value};

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Convert (key, value) pairs into a dynamic `Value::Map`.
impl<K, V> From<Vec<(K, V)>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        let map = MapRef::new(TypeTag::Any);
        for (k, v) in pairs {
            map.insert(k, v.into());
        }
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_into_map() {
        let value = Value::from(vec![("b", Value::Int(2)), ("a", Value::from("x"))]);
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(Value::from("x")));
        assert_eq!(map.value_type(), TypeTag::Any);
    }
}
