//! Process-wide runtime state with an explicit load/reload lifecycle.
//!
//! The script registry and the event→subscriber table are immutable
//! snapshots behind `RwLock<Arc<..>>`: reload builds fresh tables and
//! swaps them in whole, so concurrent readers never observe a partially
//! rebuilt table. Per-script state lives inside each [`Script`] unit
//! and is rebuilt with it.

use crate::config::RuntimeConfig;
use crate::events::{CallbackEvent, EventTable, build_event_table};
use crate::exec::{CompletionPolicy, submit};
use crate::host::{HostBridge, HostContext};
use crate::sandbox::SandboxRegistry;
use crate::script::Script;
use hearthscript_dynamic::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("script '{id}' does not exist")]
    UnknownScript { id: String },
    #[error("no sandbox strategy with id '{name}' was found")]
    UnknownSandboxStrategy { name: String },
    #[error("runtime state lock poisoned")]
    Poisoned,
}

/// One script source ready to load.
#[derive(Clone, Debug)]
pub struct ScriptSource {
    pub id: String,
    pub body: String,
}

/// Read `*.lua` files from a directory, id = file stem, sorted by id.
pub fn sources_from_dir(dir: &Path) -> std::io::Result<Vec<ScriptSource>> {
    let mut sources = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("lua") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        sources.push(ScriptSource {
            id: id.to_string(),
            body: std::fs::read_to_string(&path)?,
        });
    }
    sources.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(sources)
}

/// Outcome of a reload: which scripts loaded and which were rejected.
#[derive(Debug, Default)]
pub struct ReloadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

type ScriptMap = HashMap<String, Arc<Script>>;

struct DaylightWatch {
    is_day: bool,
}

impl DaylightWatch {
    /// Returns (day just started, night just fell).
    fn observe(&mut self, is_day: bool) -> (bool, bool) {
        let last = self.is_day;
        self.is_day = is_day;
        (!last && is_day, last && !is_day)
    }
}

pub struct ScriptRuntime {
    host: HostBridge,
    sandboxes: SandboxRegistry,
    config: RwLock<RuntimeConfig>,
    scripts: RwLock<Arc<ScriptMap>>,
    events: RwLock<Arc<EventTable>>,
    daylight: Mutex<DaylightWatch>,
}

impl ScriptRuntime {
    /// Empty runtime; call [`Self::reload`] to load scripts and
    /// populate the event table.
    pub fn new(host: HostBridge, config: RuntimeConfig) -> Self {
        Self {
            host,
            sandboxes: SandboxRegistry::builtin(),
            config: RwLock::new(config),
            scripts: RwLock::new(Arc::new(ScriptMap::new())),
            events: RwLock::new(Arc::new(build_event_table(&[]))),
            daylight: Mutex::new(DaylightWatch { is_day: true }),
        }
    }

    pub fn sandboxes(&self) -> &SandboxRegistry {
        &self.sandboxes
    }

    pub fn config(&self) -> Result<RuntimeConfig, RuntimeError> {
        Ok(self.config.read().map_err(|_| RuntimeError::Poisoned)?.clone())
    }

    /// Select a sandbox strategy by name (or clear the selection).
    /// Naming an unknown strategy is a hard error and the configuration
    /// is left untouched. Takes effect on the next reload.
    pub fn set_sandbox_strategy(&self, name: Option<&str>) -> Result<(), RuntimeError> {
        if let Some(name) = name {
            if !self.sandboxes.contains(name) {
                return Err(RuntimeError::UnknownSandboxStrategy {
                    name: name.to_string(),
                });
            }
        }
        let mut config = self.config.write().map_err(|_| RuntimeError::Poisoned)?;
        config.sandbox_strategy = name.map(ToString::to_string);
        Ok(())
    }

    /// Replace the runtime configuration (e.g. after the host re-reads
    /// it from disk). Callback changes take effect on the next
    /// repopulation or reload.
    pub fn update_config(&self, config: RuntimeConfig) -> Result<(), RuntimeError> {
        *self.config.write().map_err(|_| RuntimeError::Poisoned)? = config;
        Ok(())
    }

    /// Replace all loaded scripts with fresh units built from `sources`
    /// and repopulate the event table. Sources that fail to load are
    /// reported and skipped; the rest of the reload proceeds.
    pub fn reload(&self, sources: &[ScriptSource]) -> Result<ReloadReport, RuntimeError> {
        let config = self.config()?;
        let strategy = self
            .sandboxes
            .resolve(config.sandbox_strategy.as_deref())
            .ok_or_else(|| RuntimeError::UnknownSandboxStrategy {
                name: config.sandbox_strategy.clone().unwrap_or_default(),
            })?;

        let mut map = ScriptMap::new();
        let mut report = ReloadReport::default();
        for source in sources {
            match Script::load(&source.id, &source.body, self.host.clone(), strategy) {
                Ok(script) => {
                    map.insert(source.id.clone(), Arc::new(script));
                    report.loaded.push(source.id.clone());
                }
                Err(err) => {
                    tracing::error!(script = %source.id, error = %err, "failed to load script");
                    report.failed.push((source.id.clone(), format!("{err:#}")));
                }
            }
        }

        *self.scripts.write().map_err(|_| RuntimeError::Poisoned)? = Arc::new(map);
        self.populate_event_callbacks()?;

        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "scripts reloaded"
        );
        Ok(report)
    }

    /// Rebuild the event→subscriber table in full from the declared
    /// callbacks and swap it in.
    pub fn populate_event_callbacks(&self) -> Result<(), RuntimeError> {
        let beans = self.config()?.callbacks;
        let table = Arc::new(build_event_table(&beans));
        *self.events.write().map_err(|_| RuntimeError::Poisoned)? = table;
        Ok(())
    }

    /// Current event table snapshot.
    pub fn event_table(&self) -> Result<Arc<EventTable>, RuntimeError> {
        Ok(self.events.read().map_err(|_| RuntimeError::Poisoned)?.clone())
    }

    /// Ids of the loaded scripts, sorted.
    pub fn script_ids(&self) -> Vec<String> {
        let Ok(scripts) = self.scripts.read() else {
            return Vec::new();
        };
        let mut ids: Vec<String> = scripts.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn has(&self, id: &str) -> bool {
        self.scripts
            .read()
            .map(|scripts| scripts.contains_key(id))
            .unwrap_or(false)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Script>> {
        self.scripts.read().ok()?.get(id).cloned()
    }

    /// Execute a script by id under the threading policy.
    pub fn execute(
        &self,
        id: &str,
        ctx: Arc<dyn HostContext>,
        context: Option<Value>,
        threaded: bool,
    ) -> Result<(), RuntimeError> {
        let script = self.get(id).ok_or_else(|| RuntimeError::UnknownScript {
            id: id.to_string(),
        })?;
        submit(self.policy(threaded), id, move || {
            script.execute(ctx, context.as_ref());
        });
        Ok(())
    }

    fn policy(&self, threaded: bool) -> CompletionPolicy {
        let enabled = self
            .config
            .read()
            .map(|config| config.threading_enabled)
            .unwrap_or(false);
        if enabled && threaded {
            CompletionPolicy::Detached
        } else {
            CompletionPolicy::Inline
        }
    }

    /// Fire `event` to its subscribers in declared order. A subscriber
    /// naming a script that is not loaded is silently skipped. The
    /// context builder, when given, runs once per subscriber so each
    /// callback observes a context built specifically for it.
    pub fn dispatch(
        &self,
        event: CallbackEvent,
        ctx: &Arc<dyn HostContext>,
        ctx_builder: Option<&dyn Fn() -> Value>,
    ) {
        let Ok(events) = self.events.read().map(|t| Arc::clone(&t)) else {
            tracing::error!("event table lock poisoned; dropping dispatch");
            return;
        };
        let Ok(scripts) = self.scripts.read().map(|s| Arc::clone(&s)) else {
            tracing::error!("script registry lock poisoned; dropping dispatch");
            return;
        };
        let Some(subscribers) = events.get(&event) else {
            return;
        };

        for subscriber in subscribers {
            let Some(script) = scripts.get(&subscriber.script_id).cloned() else {
                continue;
            };
            let context = ctx_builder.map(|build| build());
            let ctx = Arc::clone(ctx);
            submit(self.policy(subscriber.threaded), &subscriber.script_id, move || {
                script.execute(ctx, context.as_ref());
            });
        }
    }

    // ── host lifecycle signals ───────────────────────────────

    pub fn on_load(&self, ctx: &Arc<dyn HostContext>) {
        self.dispatch(CallbackEvent::Load, ctx, None);
    }

    /// Tick signal; also watches the day/night edge and fires the
    /// daybreak/nightfall events on transitions.
    pub fn on_tick(&self, ctx: &Arc<dyn HostContext>, is_day: bool) {
        let (day_start, nightfall) = match self.daylight.lock() {
            Ok(mut watch) => watch.observe(is_day),
            Err(_) => (false, false),
        };

        self.dispatch(CallbackEvent::Tick, ctx, None);
        if day_start {
            self.on_day_start(ctx);
        }
        if nightfall {
            self.on_nightfall(ctx);
        }
    }

    pub fn on_day_start(&self, ctx: &Arc<dyn HostContext>) {
        self.dispatch(CallbackEvent::DayStart, ctx, None);
    }

    pub fn on_nightfall(&self, ctx: &Arc<dyn HostContext>) {
        self.dispatch(CallbackEvent::Nightfall, ctx, None);
    }

    pub fn on_entity_death(&self, ctx: &Arc<dyn HostContext>, builder: Option<&dyn Fn() -> Value>) {
        self.dispatch(CallbackEvent::EntityDies, ctx, builder);
    }

    pub fn on_entity_hurt(&self, ctx: &Arc<dyn HostContext>, builder: Option<&dyn Fn() -> Value>) {
        self.dispatch(CallbackEvent::EntityHurts, ctx, builder);
    }

    pub fn on_item_use(&self, ctx: &Arc<dyn HostContext>, builder: Option<&dyn Fn() -> Value>) {
        self.dispatch(CallbackEvent::ItemUse, ctx, builder);
    }
}
