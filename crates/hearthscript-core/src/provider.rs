//! Capability sets: named script-callable operations over base values.
//!
//! A [`ScriptObjectProvider`] exposes one host object instance as a
//! fixed mapping of operation name to boxed closure. Providers are
//! built fresh per exposure and consumed at the language boundary; the
//! script only ever holds the resulting capability table.

use crate::handle::{HandleError, HexId};
use crate::host::HostError;
use hearthscript_dynamic::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Adapt(#[from] hearthscript_dynamic::Error),
    #[error(transparent)]
    Handle(#[from] HandleError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("expected at least {expected} arguments, got {got}")]
    MissingArgument { expected: usize, got: usize },
    #[error("no host context bound for this call")]
    NoContext,
    #[error("{0}")]
    Message(String),
}

/// Result of a script-callable operation: a base value, or a nested
/// host object exposed as a fresh capability set.
pub enum ApiValue {
    Value(Value),
    Object(Box<dyn ScriptObjectProvider>),
}

impl std::fmt::Debug for ApiValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Object(_) => f.debug_tuple("Object").field(&"<object>").finish(),
        }
    }
}

impl ApiValue {
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }
}

impl From<Value> for ApiValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<i64> for ApiValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::I64(value))
    }
}

impl From<HexId> for ApiValue {
    fn from(id: HexId) -> Self {
        Self::Value(Value::String(id.to_string()))
    }
}

/// A named operation callable from scripts. Polymorphic over arity; no
/// signature is declared ahead of call time — argument count and type
/// mismatches are detected inside the function and surface as typed
/// failures.
pub type AdaptableFunction = Arc<dyn Fn(&[Value]) -> Result<ApiValue, ApiError> + Send + Sync>;

/// Ordered mapping of function name to [`AdaptableFunction`].
#[derive(Default)]
pub struct FunctionSet {
    inner: BTreeMap<String, AdaptableFunction>,
}

impl FunctionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&[Value]) -> Result<ApiValue, ApiError> + Send + Sync + 'static,
    {
        self.inner.insert(name.to_string(), Arc::new(function));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AdaptableFunction)> {
        self.inner.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn get(&self, name: &str) -> Option<&AdaptableFunction> {
        self.inner.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Factory exposing one host object instance as a capability set.
pub trait ScriptObjectProvider: Send + Sync {
    fn add_functions(&self, set: &mut FunctionSet);
}

/// Fetch a positional argument or fail with a typed arity error.
pub fn arg(args: &[Value], index: usize) -> Result<&Value, ApiError> {
    args.get(index).ok_or(ApiError::MissingArgument {
        expected: index + 1,
        got: args.len(),
    })
}
