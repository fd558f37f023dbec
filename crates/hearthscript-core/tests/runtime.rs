//! Integration tests for the scripting runtime.
//!
//! Cross-module flows: config file → script directory → reload →
//! event dispatch, over the stub host bridge.

use hearthscript_core::config::RuntimeConfig;
use hearthscript_core::events::CallbackEvent;
use hearthscript_core::host::HostContext;
use hearthscript_core::runtime::{ScriptRuntime, sources_from_dir};
use hearthscript_core::stub::{StubContext, stub_bridge};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

const CONFIG: &str = r#"
threading_enabled = false
sandbox_strategy = "restricted"

[[callback]]
event = "load"
scripts = ["greet"]

[[callback]]
event = "tick"
scripts = ["first", "second"]
"#;

fn write_scripts(dir: &Path) {
    fs::write(
        dir.join("greet.lua"),
        "if os ~= nil then error('sandbox leaked') end command.execute('hello')",
    )
    .unwrap();
    fs::write(dir.join("first.lua"), "command.execute('first')").unwrap();
    fs::write(dir.join("second.lua"), "command.execute('second')").unwrap();
    // non-lua files are ignored by the source loader
    fs::write(dir.join("notes.txt"), "not a script").unwrap();
}

fn as_ctx(ctx: &Arc<StubContext>) -> Arc<dyn HostContext> {
    Arc::clone(ctx) as Arc<dyn HostContext>
}

#[test]
fn config_to_dispatch_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    write_scripts(dir.path());

    let config: RuntimeConfig = toml::from_str(CONFIG).unwrap();
    let (bridge, commands, _) = stub_bridge();
    let runtime = ScriptRuntime::new(bridge, config);

    let sources = sources_from_dir(dir.path()).unwrap();
    let report = runtime.reload(&sources).unwrap();
    assert_eq!(report.loaded, vec!["first", "greet", "second"]);
    assert!(report.failed.is_empty());

    let ctx = StubContext::new("server");
    runtime.on_load(&as_ctx(&ctx));
    runtime.on_tick(&as_ctx(&ctx), true);

    assert!(ctx.errors().is_empty(), "errors: {:?}", ctx.errors());
    assert_eq!(commands.executed(), vec!["hello", "first", "second"]);
}

#[test]
fn config_update_removes_subscribers_on_repopulation() {
    let dir = tempfile::tempdir().unwrap();
    write_scripts(dir.path());

    let config: RuntimeConfig = toml::from_str(CONFIG).unwrap();
    let (bridge, commands, _) = stub_bridge();
    let runtime = ScriptRuntime::new(bridge, config.clone());
    runtime.reload(&sources_from_dir(dir.path()).unwrap()).unwrap();

    let ctx = StubContext::new("server");
    runtime.dispatch(CallbackEvent::Tick, &as_ctx(&ctx), None);
    assert_eq!(commands.executed(), vec!["first", "second"]);

    // drop the tick bean and repopulate: full rebuild, no leftovers
    let mut trimmed = config;
    trimmed.callbacks.retain(|bean| bean.event != "tick");
    runtime.update_config(trimmed).unwrap();
    runtime.populate_event_callbacks().unwrap();

    runtime.dispatch(CallbackEvent::Tick, &as_ctx(&ctx), None);
    assert_eq!(commands.executed(), vec!["first", "second"]);
}

#[test]
fn reload_rebuilds_script_state() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("counter.lua"),
        "n = (n or 0) + 1 command.execute('n ' .. n)",
    )
    .unwrap();

    let (bridge, commands, _) = stub_bridge();
    let runtime = ScriptRuntime::new(bridge, RuntimeConfig::default());
    let sources = sources_from_dir(dir.path()).unwrap();
    runtime.reload(&sources).unwrap();

    let ctx = StubContext::new("server");
    runtime.execute("counter", as_ctx(&ctx), None, false).unwrap();
    runtime.execute("counter", as_ctx(&ctx), None, false).unwrap();
    // reload replaces the unit: script-held globals reset
    runtime.reload(&sources).unwrap();
    runtime.execute("counter", as_ctx(&ctx), None, false).unwrap();

    assert_eq!(commands.executed(), vec!["n 1", "n 2", "n 1"]);
}

#[test]
fn threaded_callbacks_run_detached() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bg.lua"), "command.execute('bg ran')").unwrap();

    let config: RuntimeConfig = toml::from_str(
        r#"
threading_enabled = true

[[callback]]
event = "on_use"
scripts = ["bg"]
threaded = true
"#,
    )
    .unwrap();

    let (bridge, commands, _) = stub_bridge();
    let runtime = ScriptRuntime::new(bridge, config);
    runtime.reload(&sources_from_dir(dir.path()).unwrap()).unwrap();

    let ctx = StubContext::new("player");
    runtime.on_item_use(&as_ctx(&ctx), None);

    let deadline = Instant::now() + Duration::from_secs(5);
    while commands.executed().is_empty() {
        assert!(Instant::now() < deadline, "threaded callback never ran");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(commands.executed(), vec!["bg ran"]);
}

#[test]
fn unknown_events_in_config_are_tolerated() {
    let config: RuntimeConfig = toml::from_str(
        r#"
[[callback]]
event = "on_meteor_strike"
scripts = ["panic"]

[[callback]]
event = "load"
scripts = ["fine"]
"#,
    )
    .unwrap();

    let (bridge, _, _) = stub_bridge();
    let runtime = ScriptRuntime::new(bridge, config);
    runtime.populate_event_callbacks().unwrap();

    let table = runtime.event_table().unwrap();
    let total: usize = table.values().map(Vec::len).sum();
    assert_eq!(total, 1);
    assert_eq!(table[&CallbackEvent::Load].len(), 1);
}
