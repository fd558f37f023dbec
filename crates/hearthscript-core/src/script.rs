//! Script execution units.
//!
//! One [`Script`] is one loaded script: its own Lua VM with the API
//! namespaces installed as globals, plus the host-side caches those
//! namespaces share. The VM is mutex-guarded so detached and inline
//! invocations of the same script serialize instead of racing.

use crate::api::{CommandApi, EntityApi, ScriptApi};
use crate::handle::HandleCache;
use crate::host::{HostBridge, HostContext, ParsedCommand, ScriptEntity};
use crate::lua::{bind_functions, value_to_lua};
use crate::provider::ApiError;
use crate::sandbox::SandboxStrategy;
use anyhow::{Context, Result};
use hearthscript_dynamic::Value;
use mlua::Lua;
use std::sync::{Arc, Mutex};

/// State shared between a script's API namespaces and its execution
/// unit: the ambient host context of the current invocation and the
/// per-script caches addressed by opaque handles. Cache state outlives
/// a single execution but dies with the script unit.
pub struct ScriptShared {
    id: String,
    pub host: HostBridge,
    source: Mutex<Option<Arc<dyn HostContext>>>,
    preparsed: Mutex<HandleCache<Box<dyn ParsedCommand>>>,
    entity_groups: Mutex<HandleCache<Vec<Arc<dyn ScriptEntity>>>>,
}

impl ScriptShared {
    fn new(id: &str, host: HostBridge) -> Self {
        Self {
            id: id.to_string(),
            host,
            source: Mutex::new(None),
            preparsed: Mutex::new(HandleCache::new()),
            entity_groups: Mutex::new(HandleCache::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ambient privilege for the current invocation. Fails when called
    /// outside an execution (no context bound).
    pub fn source(&self) -> Result<Arc<dyn HostContext>, ApiError> {
        let slot = self
            .source
            .lock()
            .map_err(|_| ApiError::Message("context slot poisoned".to_string()))?;
        slot.clone().ok_or(ApiError::NoContext)
    }

    pub fn with_preparsed<R>(
        &self,
        f: impl FnOnce(&mut HandleCache<Box<dyn ParsedCommand>>) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut cache = self
            .preparsed
            .lock()
            .map_err(|_| ApiError::Message("command cache poisoned".to_string()))?;
        f(&mut cache)
    }

    pub fn with_entity_groups<R>(
        &self,
        f: impl FnOnce(&mut HandleCache<Vec<Arc<dyn ScriptEntity>>>) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut cache = self
            .entity_groups
            .lock()
            .map_err(|_| ApiError::Message("entity cache poisoned".to_string()))?;
        f(&mut cache)
    }

    fn bind_source(&self, ctx: Arc<dyn HostContext>) {
        if let Ok(mut slot) = self.source.lock() {
            *slot = Some(ctx);
        }
    }

    fn clear_source(&self) {
        if let Ok(mut slot) = self.source.lock() {
            *slot = None;
        }
    }
}

/// One loaded script unit.
pub struct Script {
    id: String,
    body: String,
    lua: Mutex<Lua>,
    shared: Arc<ScriptShared>,
    /// Registries instantiated for this unit; their state lives in
    /// `shared` and in the closures already installed as globals.
    apis: Vec<Box<dyn ScriptApi>>,
}

impl Script {
    /// Create the unit: fresh VM, sandbox applied before anything else,
    /// API namespaces installed as globals, body compiled once to
    /// reject syntax errors at load time.
    pub fn load(
        id: &str,
        body: &str,
        host: HostBridge,
        sandbox: &SandboxStrategy,
    ) -> Result<Self> {
        let lua = Lua::new();
        sandbox
            .apply(&lua)
            .with_context(|| format!("applying sandbox strategy '{}'", sandbox.id()))?;

        let shared = Arc::new(ScriptShared::new(id, host));
        let apis: Vec<Box<dyn ScriptApi>> = vec![
            Box::new(CommandApi::new(Arc::clone(&shared))),
            Box::new(EntityApi::new(Arc::clone(&shared))),
        ];
        for api in &apis {
            let table = bind_functions(&lua, &api.functions())
                .with_context(|| format!("binding '{}' namespace", api.namespace()))?;
            lua.globals()
                .raw_set(api.namespace(), table)
                .with_context(|| format!("installing '{}' namespace", api.namespace()))?;
        }

        lua.load(body)
            .set_name(id)
            .into_function()
            .with_context(|| format!("compiling script '{id}'"))?;

        Ok(Self {
            id: id.to_string(),
            body: body.to_string(),
            lua: Mutex::new(lua),
            shared,
            apis,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shared(&self) -> &Arc<ScriptShared> {
        &self.shared
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.apis.iter().map(|api| api.namespace())
    }

    /// Run the script body with `ctx` bound as the ambient privilege
    /// and `context` (if any) visible as the `context` global.
    ///
    /// Failures are caught here: reported to the invoking actor and
    /// logged, never propagated. The unit stays usable afterwards;
    /// state between executions is only what the script keeps in its
    /// own globals.
    pub fn execute(&self, ctx: Arc<dyn HostContext>, context: Option<&Value>) {
        let Ok(lua) = self.lua.lock() else {
            ctx.error(&format!("script '{}' is unavailable", self.id));
            return;
        };

        self.shared.bind_source(Arc::clone(&ctx));
        let result = run_body(&lua, &self.id, &self.body, context);
        self.shared.clear_source();

        if let Err(err) = result {
            tracing::warn!(script = %self.id, error = %err, "script body failed");
            ctx.error(&format!("script '{}' failed: {err}", self.id));
        }
    }
}

fn run_body(lua: &Lua, id: &str, body: &str, context: Option<&Value>) -> mlua::Result<()> {
    match context {
        Some(value) => {
            let adapted = value_to_lua(lua, value)?;
            lua.globals().raw_set("context", adapted)?;
        }
        None => {
            lua.globals().raw_set("context", mlua::Value::Nil)?;
        }
    }
    lua.load(body).set_name(id).exec()
}
