use std::fs;

use tempfile::TempDir;

use lantern_script::diagnostics::{ErrorReport, ERROR_STACK_CVAR};
use lantern_script::harness::ScriptHarness;
use lantern_script::runtime::{LifecycleState, ScriptEngine, ScriptFault, ScriptRuntime};
use lantern_script::slots::Value;
use lantern_script::{Host, RuntimeConfig};

fn scripted_config(source: &str) -> (TempDir, RuntimeConfig) {
    let dir = TempDir::new().expect("temp script root");
    let main = dir.path().join("main.ltn");
    fs::write(&main, source).expect("write main script");
    let config = RuntimeConfig {
        scripts_root: dir.path().to_string_lossy().into_owned(),
        main_script: main.to_string_lossy().into_owned(),
        ..RuntimeConfig::default()
    };
    (dir, config)
}

fn call_log(runtime: &ScriptRuntime<ScriptHarness>) -> Vec<&str> {
    runtime.engine().calls.iter().map(String::as_str).collect()
}

#[test]
fn full_session_drives_every_entry_point() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut runtime = ScriptRuntime::new(ScriptHarness::with_game_class(), config);

    runtime.init(&mut host, Some("newgame")).expect("init succeeds");
    assert_eq!(runtime.state(), LifecycleState::Running);

    assert!(runtime.update(&mut host, 16.0), "non-boolean update return keeps running");
    runtime.draw(&mut host, 320, 180);
    runtime.console(&mut host, "noclip");
    runtime.shutdown(&mut host);
    runtime.free();

    assert_eq!(runtime.state(), LifecycleState::Freed);
    assert_eq!(runtime.engine().live_handles(), 0, "every pinned handle released");
    assert_eq!(
        call_log(&runtime),
        vec!["init(_)", "update(_)", "draw(_,_)", "console(_)", "shutdown()"]
    );
}

#[test]
fn constructor_argument_reaches_the_script() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::with_game_class();
    engine.on_call("init(_)", |slots, host, _diag| {
        let arg = slots.str(1).to_string();
        host.console.print(format!("ctor:{arg}"));
        slots.set(0, Value::Instance(99));
        Ok(())
    });

    let mut runtime = ScriptRuntime::new(engine, config);
    runtime.init(&mut host, Some("save1")).expect("init succeeds");
    assert_eq!(host.console.last_line(), Some("ctor:save1"));
}

#[test]
fn missing_update_fails_init_without_leaking_handles() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::with_game_class();
    engine.remove_signature("update(_)");

    let mut runtime = ScriptRuntime::new(engine, config);
    assert!(runtime.init(&mut host, None).is_err());
    assert_eq!(runtime.state(), LifecycleState::Uninitialized);
    assert_eq!(runtime.engine().live_handles(), 0, "partial acquisition rolled back");

    let errors = host.console.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains("update(_)"));
}

#[test]
fn missing_draw_fails_init_without_leaking_handles() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::with_game_class();
    engine.remove_signature("draw(_,_)");

    let mut runtime = ScriptRuntime::new(engine, config);
    assert!(runtime.init(&mut host, None).is_err());
    assert_eq!(runtime.engine().live_handles(), 0);
}

#[test]
fn console_and_shutdown_hooks_are_optional() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::with_game_class();
    engine.remove_signature("console(_)");
    engine.remove_signature("shutdown()");

    let mut runtime = ScriptRuntime::new(engine, config);
    runtime.init(&mut host, None).expect("hooks are optional");
    runtime.console(&mut host, "noclip");
    runtime.shutdown(&mut host);
    runtime.free();

    let calls = call_log(&runtime);
    assert!(!calls.contains(&"console(_)"));
    assert!(!calls.contains(&"shutdown()"));
    assert_eq!(runtime.engine().live_handles(), 0);
}

#[test]
fn update_boolean_return_stops_the_loop() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::with_game_class();
    engine.on_call("update(_)", |slots, _host, _diag| {
        slots.set_bool(0, false);
        Ok(())
    });

    let mut runtime = ScriptRuntime::new(engine, config);
    runtime.init(&mut host, None).expect("init succeeds");
    assert!(!runtime.update(&mut host, 16.0));
}

#[test]
fn update_fault_reports_through_diagnostics_and_keeps_running() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::with_game_class();
    engine.on_call("update(_)", |_slots, host, diag| {
        diag.report(
            &mut host.console,
            ErrorReport::Frame { module: "main", line: 7, message: "boom" },
        );
        diag.report(&mut host.console, ErrorReport::StackComplete);
        Err(ScriptFault::Runtime)
    });

    let mut runtime = ScriptRuntime::new(engine, config);
    runtime.init(&mut host, None).expect("init succeeds");
    assert!(runtime.update(&mut host, 16.0), "faulted tick does not stop the loop");

    let stack = host.console.cvars.find(ERROR_STACK_CVAR).expect("error stack cvar");
    assert_eq!(stack.string, "(main:7) boom");
}

#[test]
fn compile_failure_is_a_game_error() {
    let (_dir, config) = scripted_config("clas Game {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::with_game_class();
    engine.poison_compile("clas ");

    let mut runtime = ScriptRuntime::new(engine, config);
    assert!(runtime.init(&mut host, None).is_err());
    assert_eq!(runtime.state(), LifecycleState::Uninitialized);
    assert!(host.console.errors()[0].1.contains("can't compile"));
}

#[test]
fn missing_main_script_fails_before_interpreting() {
    let config = RuntimeConfig {
        main_script: "does/not/exist.ltn".to_string(),
        ..RuntimeConfig::default()
    };
    let mut host = Host::new();
    let mut runtime = ScriptRuntime::new(ScriptHarness::with_game_class(), config);

    assert!(runtime.init(&mut host, None).is_err());
    assert!(runtime.engine().interpreted.is_empty());
    assert!(host.console.errors()[0].1.contains("couldn't load"));
}

#[test]
fn missing_entry_class_fails_init() {
    let (_dir, config) = scripted_config("class NotGame {}");
    let mut host = Host::new();
    let mut engine = ScriptHarness::new();
    for sig in ["init(_)", "update(_)", "draw(_,_)"] {
        engine.provide_signature(sig);
    }

    let mut runtime = ScriptRuntime::new(engine, config);
    assert!(runtime.init(&mut host, None).is_err());
    assert!(host.console.errors()[0].1.contains("Game"));
}

#[test]
fn imports_resolve_through_the_configured_script_tree() {
    let (dir, config) = scripted_config("class Game {}");
    fs::write(dir.path().join("hud.ltn"), "class Hud {}").expect("write hud module");

    let mut host = Host::new();
    let mut runtime = ScriptRuntime::new(ScriptHarness::with_game_class(), config);
    runtime.init(&mut host, None).expect("init succeeds");

    assert_eq!(runtime.engine().load_module("hud").as_deref(), Some("class Hud {}"));
    assert!(runtime.engine().load_module("minimap").is_none());
}

#[test]
fn eval_interprets_in_the_entry_module() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut runtime = ScriptRuntime::new(ScriptHarness::with_game_class(), config);
    runtime.init(&mut host, None).expect("init succeeds");

    runtime.eval(&mut host, "Game.cheat()").expect("eval succeeds");
    let last = runtime.engine().interpreted.last().expect("eval was interpreted");
    assert_eq!(last.0, "main");
    assert_eq!(last.1, "Game.cheat()");
}

#[test]
fn calls_outside_a_running_session_are_inert() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut runtime = ScriptRuntime::new(ScriptHarness::with_game_class(), config);

    assert!(!runtime.update(&mut host, 16.0), "update before init stops the loop");
    runtime.draw(&mut host, 320, 180);
    runtime.console(&mut host, "noclip");
    assert!(runtime.engine().calls.is_empty());

    runtime.init(&mut host, None).expect("init succeeds");
    runtime.free();
    assert!(!runtime.update(&mut host, 16.0));
    runtime.free();
    assert_eq!(runtime.state(), LifecycleState::Freed);
}

#[test]
fn shutdown_runs_the_hook_once() {
    let (_dir, config) = scripted_config("class Game {}");
    let mut host = Host::new();
    let mut runtime = ScriptRuntime::new(ScriptHarness::with_game_class(), config);
    runtime.init(&mut host, None).expect("init succeeds");

    runtime.shutdown(&mut host);
    runtime.shutdown(&mut host);
    let hooks = call_log(&runtime).iter().filter(|s| **s == "shutdown()").count();
    assert_eq!(hooks, 1);
}
