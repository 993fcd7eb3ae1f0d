use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::config::RuntimeConfig;
use crate::console::ErrorLevel;
use crate::diagnostics::Diagnostics;
use crate::dispatch::{self, ForeignClassDef, MethodDef};
use crate::host::Host;
use crate::slots::{SlotStack, ValueKind};

/// Opaque engine-owned reference pinning a script object or a compiled call
/// signature. Valid until released; the engine tracks the live count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

/// Why a script call or module interpretation failed. Details travel through
/// the diagnostics channel, not through this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFault {
    Compile,
    Runtime,
}

/// Everything the engine needs from the host at bind time: the static
/// capability tables and a module resolver.
pub struct EngineHooks {
    pub methods: &'static [MethodDef],
    pub classes: &'static [ForeignClassDef],
    pub load_module: Box<dyn Fn(&str) -> Option<String>>,
}

/// The embedded script engine, behind a seam so the runtime and its tests
/// never depend on a particular VM.
pub trait ScriptEngine {
    fn bind(&mut self, hooks: EngineHooks);
    fn interpret(
        &mut self,
        module: &str,
        source: &str,
        slots: &mut SlotStack,
        host: &mut Host,
        diag: &mut Diagnostics,
    ) -> Result<(), ScriptFault>;
    /// Copies a top-level module variable into `dest`. False when the module
    /// or variable does not exist.
    fn get_variable(&mut self, module: &str, name: &str, slots: &mut SlotStack, dest: usize)
        -> bool;
    /// Pins the value currently in `slot`.
    fn capture_handle(&mut self, slots: &SlotStack, slot: usize) -> Option<Handle>;
    /// Compiles a call signature. None when no method with that signature is
    /// reachable.
    fn make_call_handle(&mut self, signature: &str) -> Option<Handle>;
    fn set_slot_handle(&mut self, slots: &mut SlotStack, slot: usize, handle: Handle);
    /// Invokes a call handle against slot 0's receiver with the arguments in
    /// slots 1..N. The return value lands in slot 0.
    fn call(
        &mut self,
        handle: Handle,
        slots: &mut SlotStack,
        host: &mut Host,
        diag: &mut Diagnostics,
    ) -> Result<(), ScriptFault>;
    fn release_handle(&mut self, handle: Handle);
    fn live_handles(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Loaded,
    Running,
    ShuttingDown,
    Freed,
}

const CTOR_SIG: &str = "init(_)";
const UPDATE_SIG: &str = "update(_)";
const DRAW_SIG: &str = "draw(_,_)";
const SHUTDOWN_SIG: &str = "shutdown()";
const CONSOLE_SIG: &str = "console(_)";

struct EntryHandles {
    update: Handle,
    draw: Handle,
    shutdown: Option<Handle>,
    console: Option<Handle>,
    instance: Handle,
}

/// Drives one script session from load to teardown. Owns the slot stack and
/// diagnostics; the host is passed into each call so trampolines can reach
/// native services.
pub struct ScriptRuntime<E: ScriptEngine> {
    engine: E,
    config: RuntimeConfig,
    pub slots: SlotStack,
    pub diagnostics: Diagnostics,
    state: LifecycleState,
    handles: Option<EntryHandles>,
}

impl<E: ScriptEngine> ScriptRuntime<E> {
    pub fn new(engine: E, config: RuntimeConfig) -> Self {
        Self {
            engine,
            config,
            slots: SlotStack::new(),
            diagnostics: Diagnostics::new(),
            state: LifecycleState::Uninitialized,
            handles: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Loads the main script, binds the capability tables, instantiates the
    /// entry class, and pins the entry-point handles. Failure releases every
    /// handle acquired so far and leaves the runtime reusable.
    pub fn init(&mut self, host: &mut Host, constructor_arg: Option<&str>) -> Result<()> {
        if self.state != LifecycleState::Uninitialized {
            bail!("runtime already initialized");
        }

        self.engine.bind(EngineHooks {
            methods: dispatch::builtin_methods(),
            classes: dispatch::builtin_classes(),
            load_module: module_loader(&self.config),
        });

        let main_path = self.config.main_script.clone();
        let source = match fs::read_to_string(&main_path) {
            Ok(source) => source,
            Err(err) => {
                let msg = format!("couldn't load {main_path}: {err}");
                host.console.error(ErrorLevel::Game, &msg);
                bail!(msg);
            }
        };

        self.slots.reset();
        let module = self.config.entry_module.clone();
        if self
            .engine
            .interpret(&module, &source, &mut self.slots, host, &mut self.diagnostics)
            .is_err()
        {
            let msg = format!("can't compile {main_path}");
            host.console.error(ErrorLevel::Game, &msg);
            bail!(msg);
        }
        self.state = LifecycleState::Loaded;

        let class = self.config.entry_class.clone();
        self.slots.reset();
        self.slots.ensure(1);
        if !self.engine.get_variable(&module, &class, &mut self.slots, 0) {
            return self.abort_init(host, &[], format!("couldn't find {class} class in {module}"));
        }
        let Some(class_handle) = self.engine.capture_handle(&self.slots, 0) else {
            return self.abort_init(host, &[], format!("couldn't pin {class} class"));
        };

        // Entry points pin in a fixed order and release in reverse.
        let mut acquired = vec![class_handle];
        let Some(update) = self.engine.make_call_handle(UPDATE_SIG) else {
            return self.abort_init(host, &acquired, format!("couldn't find {UPDATE_SIG} on {class}"));
        };
        acquired.push(update);
        let Some(draw) = self.engine.make_call_handle(DRAW_SIG) else {
            return self.abort_init(host, &acquired, format!("couldn't find {DRAW_SIG} on {class}"));
        };
        acquired.push(draw);
        // Optional entry points: a game without a console hook or shutdown
        // hook is still valid.
        let shutdown = self.engine.make_call_handle(SHUTDOWN_SIG);
        acquired.extend(shutdown);
        let console = self.engine.make_call_handle(CONSOLE_SIG);
        acquired.extend(console);

        let Some(ctor) = self.engine.make_call_handle(CTOR_SIG) else {
            return self.abort_init(host, &acquired, format!("couldn't find {CTOR_SIG} on {class}"));
        };
        acquired.push(ctor);

        self.slots.reset();
        self.slots.ensure(2);
        self.engine.set_slot_handle(&mut self.slots, 0, class_handle);
        match constructor_arg {
            Some(arg) => self.slots.set_str(1, arg),
            None => self.slots.set_null(1),
        }
        if self
            .engine
            .call(ctor, &mut self.slots, host, &mut self.diagnostics)
            .is_err()
        {
            return self.abort_init(host, &acquired, format!("{class} constructor failed"));
        }
        self.engine.release_handle(ctor);
        acquired.pop();

        let Some(instance) = self.engine.capture_handle(&self.slots, 0) else {
            return self.abort_init(host, &acquired, format!("couldn't instantiate {class}"));
        };

        // The class handle is only needed for construction.
        self.engine.release_handle(class_handle);

        self.handles = Some(EntryHandles { update, draw, shutdown, console, instance });
        self.state = LifecycleState::Running;
        Ok(())
    }

    fn abort_init(&mut self, host: &mut Host, acquired: &[Handle], msg: String) -> Result<()> {
        for handle in acquired.iter().rev() {
            self.engine.release_handle(*handle);
        }
        host.console.error(ErrorLevel::Game, &msg);
        self.state = LifecycleState::Uninitialized;
        bail!(msg)
    }

    /// Runs one simulation tick. The script's boolean return keeps the
    /// session alive; any non-boolean return means "keep running". A call
    /// fault is reported through diagnostics and does not stop the loop.
    pub fn update(&mut self, host: &mut Host, dt: f64) -> bool {
        if self.state != LifecycleState::Running {
            return false;
        }
        let Some(handles) = &self.handles else {
            return false;
        };
        let (update, instance) = (handles.update, handles.instance);

        self.slots.reset();
        self.slots.ensure(2);
        self.engine.set_slot_handle(&mut self.slots, 0, instance);
        self.slots.set_num(1, dt);
        let _ = self.engine.call(update, &mut self.slots, host, &mut self.diagnostics);

        match self.slots.kind(0) {
            ValueKind::Bool => self.slots.bool(0),
            _ => true,
        }
    }

    pub fn draw(&mut self, host: &mut Host, width: u32, height: u32) {
        if self.state != LifecycleState::Running {
            return;
        }
        let Some(handles) = &self.handles else {
            return;
        };
        let (draw, instance) = (handles.draw, handles.instance);

        self.slots.reset();
        self.slots.ensure(3);
        self.engine.set_slot_handle(&mut self.slots, 0, instance);
        self.slots.set_num(1, f64::from(width));
        self.slots.set_num(2, f64::from(height));
        let _ = self.engine.call(draw, &mut self.slots, host, &mut self.diagnostics);
    }

    /// Forwards a console line to the script's console hook. Games without
    /// the hook ignore console input.
    pub fn console(&mut self, host: &mut Host, line: &str) {
        if self.state != LifecycleState::Running {
            return;
        }
        let Some(handles) = &self.handles else {
            return;
        };
        let Some(console) = handles.console else {
            return;
        };
        let instance = handles.instance;

        self.slots.reset();
        self.slots.ensure(2);
        self.engine.set_slot_handle(&mut self.slots, 0, instance);
        self.slots.set_str(1, line);
        let _ = self.engine.call(console, &mut self.slots, host, &mut self.diagnostics);
    }

    /// Interprets a snippet in the entry module, for console `eval` support.
    pub fn eval(&mut self, host: &mut Host, code: &str) -> Result<(), ScriptFault> {
        let module = self.config.entry_module.clone();
        self.slots.reset();
        self.engine.interpret(&module, code, &mut self.slots, host, &mut self.diagnostics)
    }

    /// Gives the script a chance to save state before teardown. Idempotent;
    /// only the first call in a running session invokes the hook.
    pub fn shutdown(&mut self, host: &mut Host) {
        if self.state != LifecycleState::Running {
            return;
        }
        self.state = LifecycleState::ShuttingDown;
        let Some(handles) = &self.handles else {
            return;
        };
        let Some(shutdown) = handles.shutdown else {
            return;
        };
        let instance = handles.instance;

        self.slots.reset();
        self.slots.ensure(1);
        self.engine.set_slot_handle(&mut self.slots, 0, instance);
        let _ = self.engine.call(shutdown, &mut self.slots, host, &mut self.diagnostics);
    }

    /// Releases every pinned handle, newest first. The session cannot be
    /// revived afterwards.
    pub fn free(&mut self) {
        if self.state == LifecycleState::Freed {
            return;
        }
        if let Some(handles) = self.handles.take() {
            self.engine.release_handle(handles.instance);
            if let Some(console) = handles.console {
                self.engine.release_handle(console);
            }
            if let Some(shutdown) = handles.shutdown {
                self.engine.release_handle(shutdown);
            }
            self.engine.release_handle(handles.draw);
            self.engine.release_handle(handles.update);
        }
        self.slots.reset();
        self.state = LifecycleState::Freed;
    }
}

/// Module resolver over the configured script tree: `name` maps to
/// `<scripts_root>/<name>.<ext>`. A missing file is a resolution miss, not an
/// error; the engine reports unresolvable imports itself.
pub fn module_loader(config: &RuntimeConfig) -> Box<dyn Fn(&str) -> Option<String>> {
    let root = PathBuf::from(&config.scripts_root);
    let extension = config.module_extension.clone();
    Box::new(move |name| {
        let path = root.join(format!("{name}.{extension}"));
        fs::read_to_string(path).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn module_loader_resolves_relative_to_the_script_root() {
        let dir = TempDir::new().expect("temp script root");
        let path = dir.path().join("hud.ltn");
        let mut file = fs::File::create(&path).expect("create module");
        write!(file, "class Hud {{}}").expect("write module");

        let config = RuntimeConfig {
            scripts_root: dir.path().to_string_lossy().into_owned(),
            ..RuntimeConfig::default()
        };
        let load = module_loader(&config);
        assert_eq!(load("hud").as_deref(), Some("class Hud {}"));
        assert!(load("missing").is_none(), "missing module is a miss, not an error");
    }

    #[test]
    fn module_loader_honors_the_configured_extension() {
        let dir = TempDir::new().expect("temp script root");
        fs::write(dir.path().join("main.script"), "x").expect("write module");

        let config = RuntimeConfig {
            scripts_root: dir.path().to_string_lossy().into_owned(),
            module_extension: "script".to_string(),
            ..RuntimeConfig::default()
        };
        let load = module_loader(&config);
        assert!(load("main").is_some());
    }
}
