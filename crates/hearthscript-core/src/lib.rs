//! Embeddable Lua scripting layer for game-server hosts.
//!
//! The host application exposes its capabilities (commands, entities,
//! world state) through the collaborator traits in [`host`]; scripts
//! reach them through namespaced API registries ([`api`]) whose
//! functions exchange tagged base values ([`hearthscript_dynamic::Value`]).
//! Host lifecycle signals (load, tick, day/night transitions) are routed
//! to subscribed scripts by the [`runtime::ScriptRuntime`] dispatch
//! table, inline or on detached worker threads per callback.

pub mod api;
pub mod config;
pub mod events;
pub mod exec;
pub mod handle;
pub mod host;
pub mod logging;
pub mod lua;
pub mod provider;
pub mod runtime;
pub mod sandbox;
pub mod script;
pub mod stub;

pub use hearthscript_dynamic::{Array, Object, ToDynamic, Value};
