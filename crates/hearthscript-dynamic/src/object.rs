use crate::Value;
use core::cmp::Ordering;
use core::ops::{Deref, DerefMut};
use std::collections::BTreeMap;

/// Heterogeneous ordered mapping of [`Value`] to [`Value`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Object {
    inner: BTreeMap<Value, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    /// Look up an entry whose key is the given string.
    pub fn get_by_str(&self, field_name: &str) -> Option<&Value> {
        self.inner.get(&Value::String(field_name.to_string()))
    }
}

impl core::fmt::Debug for Object {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.inner.fmt(fmt)
    }
}

impl Ord for Object {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl PartialOrd for Object {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<BTreeMap<Value, Value>> for Object {
    fn from(inner: BTreeMap<Value, Value>) -> Self {
        Self { inner }
    }
}

impl Deref for Object {
    type Target = BTreeMap<Value, Value>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Object {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl IntoIterator for Object {
    type Item = (Value, Value);
    type IntoIter = <BTreeMap<Value, Value> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a Value, &'a Value);
    type IntoIter = <&'a BTreeMap<Value, Value> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl FromIterator<(Value, Value)> for Object {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        Self {
            inner: BTreeMap::from_iter(iter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_by_str_finds_string_keys() {
        let obj: Object = vec![
            (Value::String("a".to_string()), Value::I64(1)),
            (Value::String("b".to_string()), Value::I64(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(obj.get_by_str("a"), Some(&Value::I64(1)));
        assert_eq!(obj.get_by_str("missing"), None);
    }

    #[test]
    fn non_string_keys_are_allowed() {
        let obj: Object = vec![(Value::I64(1), Value::Bool(true))].into_iter().collect();
        assert_eq!(obj.get(&Value::I64(1)), Some(&Value::Bool(true)));
        assert_eq!(obj.get_by_str("1"), None);
    }

    #[test]
    fn insert_via_deref_mut() {
        let mut obj = Object::new();
        obj.insert(Value::String("k".to_string()), Value::Null);
        assert_eq!(obj.len(), 1);
    }
}
