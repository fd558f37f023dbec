use crate::object::Object;
use crate::value::Value;
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// The ToDynamic trait allows a type to emit a representation of itself
/// as the [`Value`] type. This is the host-data half of `adapt`:
/// recursive over sequences and mappings, terminating on acyclic input.
pub trait ToDynamic {
    fn to_dynamic(&self) -> Value;
}

impl ToDynamic for Value {
    fn to_dynamic(&self) -> Value {
        self.clone()
    }
}

impl ToDynamic for () {
    fn to_dynamic(&self) -> Value {
        Value::Null
    }
}

impl ToDynamic for bool {
    fn to_dynamic(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToDynamic for str {
    fn to_dynamic(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToDynamic for String {
    fn to_dynamic(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToDynamic for char {
    fn to_dynamic(&self) -> Value {
        Value::String(self.to_string())
    }
}

macro_rules! int_to_dynamic {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToDynamic for $ty {
                fn to_dynamic(&self) -> Value {
                    Value::I64(i64::from(*self))
                }
            }
        )*
    };
}

int_to_dynamic!(i8, i16, i32, i64, u8, u16, u32);

impl ToDynamic for f32 {
    fn to_dynamic(&self) -> Value {
        Value::F64(OrderedFloat(f64::from(*self)))
    }
}

impl ToDynamic for f64 {
    fn to_dynamic(&self) -> Value {
        Value::F64(OrderedFloat(*self))
    }
}

impl<T: ToDynamic> ToDynamic for Option<T> {
    fn to_dynamic(&self) -> Value {
        match self {
            None => Value::Null,
            Some(t) => t.to_dynamic(),
        }
    }
}

impl<T: ToDynamic> ToDynamic for Arc<T> {
    fn to_dynamic(&self) -> Value {
        self.as_ref().to_dynamic()
    }
}

impl<T: ToDynamic> ToDynamic for Box<T> {
    fn to_dynamic(&self) -> Value {
        self.as_ref().to_dynamic()
    }
}

impl<T: ToDynamic + ?Sized> ToDynamic for &T {
    fn to_dynamic(&self) -> Value {
        (*self).to_dynamic()
    }
}

impl<T: ToDynamic> ToDynamic for [T] {
    fn to_dynamic(&self) -> Value {
        Value::Array(self.iter().map(ToDynamic::to_dynamic).collect())
    }
}

impl<T: ToDynamic, const N: usize> ToDynamic for [T; N] {
    fn to_dynamic(&self) -> Value {
        self.as_slice().to_dynamic()
    }
}

impl<T: ToDynamic> ToDynamic for Vec<T> {
    fn to_dynamic(&self) -> Value {
        self.as_slice().to_dynamic()
    }
}

impl<K: ToDynamic, V: ToDynamic> ToDynamic for BTreeMap<K, V> {
    fn to_dynamic(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.to_dynamic(), v.to_dynamic()))
                .collect::<Object>(),
        )
    }
}

impl<K: ToDynamic, V: ToDynamic> ToDynamic for HashMap<K, V> {
    fn to_dynamic(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.to_dynamic(), v.to_dynamic()))
                .collect::<Object>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_adapt() {
        assert_eq!(true.to_dynamic(), Value::Bool(true));
        assert_eq!(7_i32.to_dynamic(), Value::I64(7));
        assert_eq!(2.5_f64.to_dynamic(), Value::float(2.5));
        assert_eq!("s".to_dynamic(), Value::from("s"));
        assert_eq!(().to_dynamic(), Value::Null);
    }

    #[test]
    fn option_adapts_to_null_or_inner() {
        assert_eq!(None::<i32>.to_dynamic(), Value::Null);
        assert_eq!(Some(3_i32).to_dynamic(), Value::I64(3));
    }

    #[test]
    fn sequences_adapt_recursively_in_order() {
        let v = vec![vec![1_i32, 2], vec![3]];
        let adapted = v.to_dynamic();
        let outer = adapted.as_array().unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(outer[0].as_array().unwrap()[1], Value::I64(2));
        assert_eq!(outer[1].as_array().unwrap()[0], Value::I64(3));
    }

    #[test]
    fn mappings_adapt_keys_and_values() {
        let mut m = BTreeMap::new();
        m.insert("health".to_string(), 20_i32);
        m.insert("level".to_string(), 3_i32);
        let adapted = m.to_dynamic();
        let obj = adapted.as_object().unwrap();
        assert_eq!(obj.get_by_str("health"), Some(&Value::I64(20)));
        assert_eq!(obj.get_by_str("level"), Some(&Value::I64(3)));
    }

    #[test]
    fn hashmap_with_non_string_keys() {
        let mut m = HashMap::new();
        m.insert(1_i32, "one");
        let adapted = m.to_dynamic();
        let obj = adapted.as_object().unwrap();
        assert_eq!(obj.get(&Value::I64(1)), Some(&Value::from("one")));
    }

    #[test]
    fn round_trip_semantic_content_preserved() {
        // adapt then inspect: primitives equal, pairs equal, order kept
        let mut inner = BTreeMap::new();
        inner.insert("xs".to_string(), vec![1_i64, 2, 3]);
        let adapted = inner.to_dynamic();
        let xs = adapted
            .as_object()
            .unwrap()
            .get_by_str("xs")
            .unwrap()
            .as_array()
            .unwrap();
        let back: Vec<i64> = xs.iter().map(|v| v.as_long().unwrap()).collect();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
