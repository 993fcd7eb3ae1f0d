//! In-tree fixture engine for exercising the runtime without a real VM.
//! Tests script it by defining module variables, resolvable signatures, and
//! per-signature behaviors.

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::host::Host;
use crate::runtime::{EngineHooks, Handle, ScriptEngine, ScriptFault};
use crate::slots::{SlotStack, Value};

type Behavior =
    Box<dyn FnMut(&mut SlotStack, &mut Host, &mut Diagnostics) -> Result<(), ScriptFault>>;

enum HandleTarget {
    Value(Value),
    Call(String),
}

#[derive(Default)]
pub struct ScriptHarness {
    hooks: Option<EngineHooks>,
    variables: HashMap<(String, String), Value>,
    signatures: Vec<String>,
    behaviors: HashMap<String, Behavior>,
    handles: HashMap<u64, HandleTarget>,
    next_handle: u64,
    next_instance: u64,
    compile_poison: Vec<String>,
    /// Every `(module, source)` pair passed to `interpret`, in order.
    pub interpreted: Vec<(String, String)>,
    /// Every call-handle signature invoked, in order.
    pub calls: Vec<String>,
}

impl ScriptHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// A harness preloaded with the standard entry surface: a `Game` class in
    /// `main` with every entry-point signature resolvable.
    pub fn with_game_class() -> Self {
        let mut harness = Self::new();
        harness.define_variable("main", "Game", Value::Instance(1));
        for sig in ["init(_)", "update(_)", "draw(_,_)", "shutdown()", "console(_)"] {
            harness.provide_signature(sig);
        }
        harness
    }

    pub fn define_variable(&mut self, module: &str, name: &str, value: Value) {
        self.variables.insert((module.to_string(), name.to_string()), value);
    }

    pub fn provide_signature(&mut self, signature: &str) {
        if !self.signatures.iter().any(|s| s == signature) {
            self.signatures.push(signature.to_string());
        }
    }

    pub fn remove_signature(&mut self, signature: &str) {
        self.signatures.retain(|s| s != signature);
    }

    /// Installs the behavior run when the given signature is called. Without
    /// one, calls succeed and leave the slots as the runtime set them, except
    /// `init(_)` which replaces slot 0 with a fresh instance.
    pub fn on_call(
        &mut self,
        signature: &str,
        behavior: impl FnMut(&mut SlotStack, &mut Host, &mut Diagnostics) -> Result<(), ScriptFault>
            + 'static,
    ) {
        self.behaviors.insert(signature.to_string(), Box::new(behavior));
    }

    /// Any interpreted source containing `fragment` fails as a compile fault.
    pub fn poison_compile(&mut self, fragment: &str) {
        self.compile_poison.push(fragment.to_string());
    }

    pub fn hooks(&self) -> Option<&EngineHooks> {
        self.hooks.as_ref()
    }

    /// Resolves a module through the bound loader, as an import would.
    pub fn load_module(&self, name: &str) -> Option<String> {
        self.hooks.as_ref().and_then(|hooks| (hooks.load_module)(name))
    }

    fn alloc(&mut self, target: HandleTarget) -> Handle {
        self.next_handle += 1;
        self.handles.insert(self.next_handle, target);
        Handle(self.next_handle)
    }
}

impl ScriptEngine for ScriptHarness {
    fn bind(&mut self, hooks: EngineHooks) {
        self.hooks = Some(hooks);
    }

    fn interpret(
        &mut self,
        module: &str,
        source: &str,
        _slots: &mut SlotStack,
        _host: &mut Host,
        _diag: &mut Diagnostics,
    ) -> Result<(), ScriptFault> {
        self.interpreted.push((module.to_string(), source.to_string()));
        if self.compile_poison.iter().any(|p| source.contains(p)) {
            return Err(ScriptFault::Compile);
        }
        Ok(())
    }

    fn get_variable(
        &mut self,
        module: &str,
        name: &str,
        slots: &mut SlotStack,
        dest: usize,
    ) -> bool {
        match self.variables.get(&(module.to_string(), name.to_string())) {
            Some(value) => {
                slots.set(dest, value.clone());
                true
            }
            None => false,
        }
    }

    fn capture_handle(&mut self, slots: &SlotStack, slot: usize) -> Option<Handle> {
        let value = slots.get(slot).clone();
        if matches!(value, Value::Null) {
            return None;
        }
        Some(self.alloc(HandleTarget::Value(value)))
    }

    fn make_call_handle(&mut self, signature: &str) -> Option<Handle> {
        if !self.signatures.iter().any(|s| s == signature) {
            return None;
        }
        Some(self.alloc(HandleTarget::Call(signature.to_string())))
    }

    fn set_slot_handle(&mut self, slots: &mut SlotStack, slot: usize, handle: Handle) {
        let value = match self.handles.get(&handle.0) {
            Some(HandleTarget::Value(value)) => value.clone(),
            _ => Value::Null,
        };
        slots.set(slot, value);
    }

    fn call(
        &mut self,
        handle: Handle,
        slots: &mut SlotStack,
        host: &mut Host,
        diag: &mut Diagnostics,
    ) -> Result<(), ScriptFault> {
        let signature = match self.handles.get(&handle.0) {
            Some(HandleTarget::Call(sig)) => sig.clone(),
            _ => return Err(ScriptFault::Runtime),
        };
        self.calls.push(signature.clone());

        if let Some(behavior) = self.behaviors.get_mut(&signature) {
            return behavior(slots, host, diag);
        }
        if signature == "init(_)" {
            self.next_instance += 1;
            slots.set(0, Value::Instance(self.next_instance));
        }
        Ok(())
    }

    fn release_handle(&mut self, handle: Handle) {
        self.handles.remove(&handle.0);
    }

    fn live_handles(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_counted_until_released() {
        let mut harness = ScriptHarness::with_game_class();
        let update = harness.make_call_handle("update(_)").expect("resolvable");
        let draw = harness.make_call_handle("draw(_,_)").expect("resolvable");
        assert_eq!(harness.live_handles(), 2);
        harness.release_handle(draw);
        harness.release_handle(update);
        assert_eq!(harness.live_handles(), 0);
    }

    #[test]
    fn default_init_call_produces_an_instance() {
        let mut harness = ScriptHarness::with_game_class();
        let mut slots = SlotStack::new();
        let mut host = Host::new();
        let mut diag = Diagnostics::new();

        let ctor = harness.make_call_handle("init(_)").expect("resolvable");
        harness.call(ctor, &mut slots, &mut host, &mut diag).expect("ctor succeeds");
        assert!(matches!(slots.get(0), Value::Instance(_)));
    }

    #[test]
    fn unknown_signatures_do_not_resolve() {
        let mut harness = ScriptHarness::with_game_class();
        harness.remove_signature("console(_)");
        assert!(harness.make_call_handle("console(_)").is_none());
        assert!(harness.make_call_handle("teleport()").is_none());
    }
}
