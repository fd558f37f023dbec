use crate::Value;
use core::cmp::Ordering;
use core::ops::{Deref, DerefMut};

/// Ordered sequence of [`Value`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Array {
    inner: Vec<Value>,
}

impl Array {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }
}

// Arrays can appear as Object keys, so an arbitrary-but-total order
// is required; element-wise comparison keeps it deterministic.
impl Ord for Array {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl PartialOrd for Array {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Vec<Value>> for Array {
    fn from(inner: Vec<Value>) -> Self {
        Self { inner }
    }
}

impl Deref for Array {
    type Target = Vec<Value>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Array {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = <Vec<Value> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = <&'a Vec<Value> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            inner: Vec::from_iter(iter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_empty_array() {
        let a = Array::new();
        assert!(a.is_empty());
        assert_eq!(a.len(), 0);
    }

    #[test]
    fn from_vec_preserves_order() {
        let a: Array = vec![Value::I64(3), Value::I64(1), Value::I64(2)].into();
        assert_eq!(a[0], Value::I64(3));
        assert_eq!(a[1], Value::I64(1));
        assert_eq!(a[2], Value::I64(2));
    }

    #[test]
    fn collect_from_iterator() {
        let a: Array = (0..4).map(Value::I64).collect();
        assert_eq!(a.len(), 4);
        assert_eq!(a[3], Value::I64(3));
    }

    #[test]
    fn deref_mut_allows_push() {
        let mut a = Array::new();
        a.push(Value::Bool(true));
        assert_eq!(a.len(), 1);
    }
}
