//! Lua side of the base-value bridge.
//!
//! Converts recursively between [`Value`] and `mlua::Value`, and binds
//! capability sets ([`FunctionSet`], [`ScriptObjectProvider`]) into Lua
//! tables whose entries unwrap incoming arguments into base values,
//! invoke the adaptable function, and adapt its result back.
//!
//! Lua has a single associative primitive, so "map" versus "list" is
//! disambiguated by key shape: a table is a collection iff every key
//! present is numeric. This exact rule is load-bearing for script
//! compatibility and is pinned by tests.

use crate::provider::{ApiValue, FunctionSet, ScriptObjectProvider};
use hearthscript_dynamic::{Array, Error as AdaptError, Object, Value};
use mlua::{Lua, MultiValue, Table};
use std::sync::Arc;

/// Adapt a script-native value into a base value.
///
/// Recursive; terminates on acyclic input. Functions, userdata and
/// threads cannot cross the boundary.
pub fn lua_to_value(value: mlua::Value) -> mlua::Result<Value> {
    match value {
        mlua::Value::Nil => Ok(Value::Null),
        mlua::Value::Boolean(b) => Ok(Value::Bool(b)),
        mlua::Value::Integer(i) => Ok(Value::I64(i)),
        mlua::Value::Number(n) => Ok(Value::float(n)),
        mlua::Value::String(s) => Ok(Value::String(s.to_str()?.to_string())),
        mlua::Value::Table(t) => table_to_value(&t),
        other => Err(mlua::Error::external(AdaptError::NoConversion {
            source_type: other.type_name(),
            dest_type: "Value",
        })),
    }
}

fn table_to_value(table: &Table) -> mlua::Result<Value> {
    let mut all_numeric = true;
    let mut entries = Vec::new();
    for pair in table.clone().pairs::<mlua::Value, mlua::Value>() {
        let (key, value) = pair?;
        if !matches!(key, mlua::Value::Integer(_) | mlua::Value::Number(_)) {
            all_numeric = false;
        }
        entries.push((key, value));
    }

    if all_numeric {
        // Collection: the contiguous 1-based sequence view.
        let len = table.raw_len();
        let mut items = Vec::with_capacity(len);
        for i in 1..=len {
            let item: mlua::Value = table.raw_get(i as i64)?;
            items.push(lua_to_value(item)?);
        }
        Ok(Value::Array(Array::from(items)))
    } else {
        let mut object = Object::new();
        for (key, value) in entries {
            object.insert(lua_to_value(key)?, lua_to_value(value)?);
        }
        Ok(Value::Object(object))
    }
}

/// Adapt a base value into a script-native value. Arrays become
/// 1-indexed tables; object keys are adapted recursively.
pub fn value_to_lua<'lua>(lua: &'lua Lua, value: &Value) -> mlua::Result<mlua::Value<'lua>> {
    match value {
        Value::Null => Ok(mlua::Value::Nil),
        Value::Bool(b) => Ok(mlua::Value::Boolean(*b)),
        Value::I64(i) => Ok(mlua::Value::Integer(*i)),
        Value::F64(f) => Ok(mlua::Value::Number(f.into_inner())),
        Value::String(s) => Ok(mlua::Value::String(lua.create_string(s)?)),
        Value::Array(items) => {
            let table = lua.create_table()?;
            for (index, item) in items.iter().enumerate() {
                table.raw_set(index as i64 + 1, value_to_lua(lua, item)?)?;
            }
            Ok(mlua::Value::Table(table))
        }
        Value::Object(object) => {
            let table = lua.create_table()?;
            for (key, entry) in object {
                table.raw_set(value_to_lua(lua, key)?, value_to_lua(lua, entry)?)?;
            }
            Ok(mlua::Value::Table(table))
        }
    }
}

/// Build the script-native table for a capability set: each function
/// name bound to an adapter that unwraps Lua varargs into base values,
/// invokes the adaptable function, and adapts the result back.
pub fn bind_functions<'lua>(lua: &'lua Lua, set: &FunctionSet) -> mlua::Result<Table<'lua>> {
    let table = lua.create_table()?;
    for (name, function) in set.iter() {
        let function = Arc::clone(function);
        let bound = lua.create_function(move |lua, args: MultiValue| {
            let mut adapted = Vec::with_capacity(args.len());
            for value in args {
                adapted.push(lua_to_value(value)?);
            }
            match function(&adapted) {
                Ok(result) => api_value_to_lua(lua, result),
                Err(err) => Err(mlua::Error::external(err)),
            }
        })?;
        table.raw_set(name, bound)?;
    }
    Ok(table)
}

/// Expose one host object as a script-native capability table.
pub fn bind_object<'lua>(
    lua: &'lua Lua,
    provider: &dyn ScriptObjectProvider,
) -> mlua::Result<Table<'lua>> {
    let mut set = FunctionSet::new();
    provider.add_functions(&mut set);
    bind_functions(lua, &set)
}

fn api_value_to_lua<'lua>(lua: &'lua Lua, value: ApiValue) -> mlua::Result<mlua::Value<'lua>> {
    match value {
        ApiValue::Value(value) => value_to_lua(lua, &value),
        ApiValue::Object(provider) => Ok(mlua::Value::Table(bind_object(lua, provider.as_ref())?)),
    }
}
