//! Named sandbox strategies applied to a script's Lua VM at load time.
//!
//! A strategy is a restriction policy, not a security boundary: it runs
//! once, before any script body executes. Selection is by name from
//! configuration; naming a strategy that does not exist is a hard error
//! at selection time.

use mlua::Lua;
use std::collections::BTreeMap;

/// Globals stripped by the `restricted` strategy.
const RESTRICTED_GLOBALS: &[&str] = &[
    "os", "io", "debug", "load", "loadfile", "dofile", "require", "package",
];

#[derive(Clone, Copy)]
pub struct SandboxStrategy {
    id: &'static str,
    summary: &'static str,
    apply: fn(&Lua) -> mlua::Result<()>,
}

impl SandboxStrategy {
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn summary(&self) -> &'static str {
        self.summary
    }

    pub fn apply(&self, lua: &Lua) -> mlua::Result<()> {
        (self.apply)(lua)
    }
}

/// Registry of available strategies, selected by configuration.
pub struct SandboxRegistry {
    strategies: BTreeMap<&'static str, SandboxStrategy>,
}

impl Default for SandboxRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SandboxRegistry {
    /// The built-in strategy set. `permissive` is the fallback used
    /// when no strategy is configured.
    pub fn builtin() -> Self {
        let mut strategies = BTreeMap::new();
        for strategy in [
            SandboxStrategy {
                id: "permissive",
                summary: "full Lua standard library",
                apply: apply_permissive,
            },
            SandboxStrategy {
                id: "restricted",
                summary: "filesystem, process and loader globals removed",
                apply: apply_restricted,
            },
        ] {
            strategies.insert(strategy.id, strategy);
        }
        Self { strategies }
    }

    pub fn get(&self, name: &str) -> Option<&SandboxStrategy> {
        self.strategies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SandboxStrategy> {
        self.strategies.values()
    }

    /// Strategy for an optional configured name; `None` selects the
    /// permissive fallback.
    pub fn resolve(&self, name: Option<&str>) -> Option<&SandboxStrategy> {
        match name {
            Some(name) => self.get(name),
            None => self.get("permissive"),
        }
    }
}

fn apply_permissive(_lua: &Lua) -> mlua::Result<()> {
    Ok(())
}

fn apply_restricted(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();
    for name in RESTRICTED_GLOBALS {
        globals.raw_set(*name, mlua::Value::Nil)?;
    }
    Ok(())
}
