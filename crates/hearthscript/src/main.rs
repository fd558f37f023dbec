//! hearth — command-line front end over hearthscript-core.
//!
//! Loads the runtime configuration and a directory of Lua scripts,
//! then executes scripts, inspects the subscriber table, or manages
//! the sandbox-strategy selection. Scripts run against the stub host
//! bridge (standalone mode); embedding hosts wire their own bridge.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hearthscript_core::Value;
use hearthscript_core::config::RuntimeConfig;
use hearthscript_core::events::CallbackEvent;
use hearthscript_core::host::HostContext;
use hearthscript_core::logging::{LogConfig, init_logging};
use hearthscript_core::runtime::{RuntimeError, ScriptRuntime, sources_from_dir};
use hearthscript_core::sandbox::SandboxStrategy;
use hearthscript_core::stub::stub_bridge;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hearth", version, about = "Run and manage hearthscript Lua scripts")]
struct Cli {
    /// Runtime configuration file
    #[arg(long, default_value = "hearthscript.toml")]
    config: PathBuf,

    /// Directory of .lua scripts
    #[arg(long, default_value = "scripts")]
    scripts: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a loaded script by id
    Run {
        script: String,

        /// Structured context (a JSON object) made visible to the
        /// script as the `context` global
        #[arg(long)]
        context: Option<String>,

        /// Run on a detached worker instead of inline
        #[arg(long)]
        threaded: bool,
    },
    /// List loaded scripts
    List,
    /// Show the event subscriber table
    Events,
    /// Load every script and report which ones fail
    Check,
    /// Manage the sandbox strategy selection
    Sandbox {
        #[command(subcommand)]
        action: SandboxAction,
    },
}

#[derive(Subcommand)]
enum SandboxAction {
    /// Select a strategy by name (takes effect after reload)
    Set { name: String },
    /// Clear the selection (fall back to permissive)
    Clear,
    /// List available strategies
    List,
}

/// Host context for interactive use: feedback to stdout, errors to
/// stderr.
struct ConsoleContext;

impl HostContext for ConsoleContext {
    fn name(&self) -> &str {
        "console"
    }

    fn feedback(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RuntimeConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_logging(&LogConfig {
        level: config.log_level.clone(),
        ..LogConfig::default()
    })
    .context("initializing logging")?;

    let (bridge, _, _) = stub_bridge();
    let runtime = ScriptRuntime::new(bridge, config);

    match cli.command {
        Command::Run {
            script,
            context,
            threaded,
        } => {
            reload(&runtime, &cli.scripts)?;
            let context = context
                .map(|raw| -> Result<Value> {
                    let json: serde_json::Value =
                        serde_json::from_str(&raw).context("parsing --context as JSON")?;
                    Ok(json_to_value(json))
                })
                .transpose()?;

            let ctx: Arc<dyn HostContext> = Arc::new(ConsoleContext);
            match runtime.execute(&script, ctx, context, threaded) {
                Ok(()) => {}
                Err(RuntimeError::UnknownScript { id }) => {
                    bail!("script '{id}' does not exist; run `hearth list` for loaded scripts")
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::List => {
            reload(&runtime, &cli.scripts)?;
            let ids = runtime.script_ids();
            println!("Total: {}", ids.len());
            for id in ids {
                println!("{id}");
            }
        }
        Command::Events => {
            reload(&runtime, &cli.scripts)?;
            let table = runtime.event_table()?;
            for event in CallbackEvent::ALL {
                let Some(subscribers) = table.get(&event) else {
                    continue;
                };
                if subscribers.is_empty() {
                    continue;
                }
                println!("{}:", event.id());
                for subscriber in subscribers {
                    let mode = if subscriber.threaded { "threaded" } else { "inline" };
                    println!("  {} ({mode})", subscriber.script_id);
                }
            }
        }
        Command::Check => {
            let report = reload(&runtime, &cli.scripts)?;
            println!("Loaded: {}", report.loaded.len());
            for (id, reason) in &report.failed {
                println!("FAILED {id}: {reason}");
            }
            if !report.failed.is_empty() {
                bail!("{} script(s) failed to load", report.failed.len());
            }
        }
        Command::Sandbox { action } => match action {
            SandboxAction::Set { name } => {
                let ctx = ConsoleContext;
                runtime.set_sandbox_strategy(Some(&name))?;
                persist_config(&runtime, &cli.config)?;
                ctx.feedback(&format!(
                    "Set sandbox strategy '{name}'. Takes effect on the next reload."
                ));
            }
            SandboxAction::Clear => {
                let ctx = ConsoleContext;
                runtime.set_sandbox_strategy(None)?;
                persist_config(&runtime, &cli.config)?;
                ctx.feedback("Cleared sandbox strategy (using permissive fallback).");
            }
            SandboxAction::List => {
                let config = runtime.config()?;
                if let Some(current) = config.sandbox_strategy {
                    println!("Current: {current}");
                }
                let strategies: Vec<&SandboxStrategy> = runtime.sandboxes().iter().collect();
                println!("Total: {}", strategies.len());
                for strategy in strategies {
                    println!("{}: {}", strategy.id(), strategy.summary());
                }
            }
        },
    }

    Ok(())
}

fn reload(
    runtime: &ScriptRuntime,
    scripts: &Path,
) -> Result<hearthscript_core::runtime::ReloadReport> {
    let sources = if scripts.is_dir() {
        sources_from_dir(scripts)
            .with_context(|| format!("reading scripts from {}", scripts.display()))?
    } else {
        tracing::warn!(dir = %scripts.display(), "script directory not found");
        Vec::new()
    };
    Ok(runtime.reload(&sources)?)
}

fn persist_config(runtime: &ScriptRuntime, path: &Path) -> Result<()> {
    runtime
        .config()?
        .save(path)
        .with_context(|| format!("writing {}", path.display()))
}

/// Adapt a parsed JSON document into a base value.
fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::I64)
            .or_else(|| n.as_f64().map(Value::float))
            .unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (Value::String(key), json_to_value(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_adapts_recursively() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"n": 3, "xs": [1, 2.5, "x"], "ok": true}"#).unwrap();
        let value = json_to_value(json);
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get_by_str("n"), Some(&Value::I64(3)));
        assert_eq!(obj.get_by_str("ok"), Some(&Value::Bool(true)));
        let xs = obj.get_by_str("xs").unwrap().as_array().unwrap();
        assert_eq!(xs[0], Value::I64(1));
        assert_eq!(xs[1], Value::float(2.5));
        assert_eq!(xs[2], Value::from("x"));
    }

    #[test]
    fn json_null_is_base_null() {
        assert_eq!(json_to_value(serde_json::Value::Null), Value::Null);
    }
}
