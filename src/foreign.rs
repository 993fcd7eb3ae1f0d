use crate::console::Cvar;
use crate::host::Host;
use crate::slots::{SlotStack, ValueKind};

/// Storage of a VM-owned foreign wrapper. The console-variable wrapper keeps
/// the variable's *name* and re-resolves it on every access, so a variable
/// removed between script calls is a plain lookup miss rather than a dangling
/// reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignCell {
    ConsoleVar { name: String },
}

/// Allocation hook for `CVar.new(name, default)`. The default string is
/// derived from the constructor argument's runtime kind.
pub fn cvar_allocate(slots: &mut SlotStack, host: &mut Host) {
    slots.ensure(3);
    let name = slots.str(1).to_string();
    let default = match slots.kind(2) {
        ValueKind::Num => {
            let value = slots.num(2);
            format!("{value}")
        }
        ValueKind::Bool => if slots.bool(2) { "1" } else { "0" }.to_string(),
        ValueKind::Str => slots.str(2).to_string(),
        _ => "0".to_string(),
    };
    host.console.cvars.get_or_default(&name, &default);
    slots.set_foreign(0, ForeignCell::ConsoleVar { name });
}

/// The wrapper does not own the variable; the store does.
pub fn cvar_finalize(_cell: &mut ForeignCell) {}

/// Resolves the receiver in slot 0 to a live console variable. `None` when
/// the receiver is not a cvar wrapper or the variable has been removed.
fn receiver_var(slots: &SlotStack, host: &Host) -> Option<Cvar> {
    let cell = slots.foreign(0)?;
    let name = match &*cell.borrow() {
        ForeignCell::ConsoleVar { name } => name.clone(),
    };
    host.console.cvars.find(&name).cloned()
}

pub fn cvar_bool(slots: &mut SlotStack, host: &mut Host) {
    let Some(var) = receiver_var(slots, host) else {
        return;
    };
    let truthy = var.value > 0.0 || !var.string.starts_with('0') || var.string.len() > 1;
    slots.set_bool(0, truthy);
}

pub fn cvar_number(slots: &mut SlotStack, host: &mut Host) {
    let Some(var) = receiver_var(slots, host) else {
        return;
    };
    slots.set_num(0, var.value);
}

pub fn cvar_string(slots: &mut SlotStack, host: &mut Host) {
    let Some(var) = receiver_var(slots, host) else {
        return;
    };
    slots.set_str(0, var.string);
}

pub fn cvar_set(slots: &mut SlotStack, host: &mut Host) {
    let Some(var) = receiver_var(slots, host) else {
        return;
    };
    let value = match slots.kind(1) {
        ValueKind::Num => {
            let n = slots.num(1);
            format!("{n}")
        }
        ValueKind::Bool => if slots.bool(1) { "1" } else { "0" }.to_string(),
        ValueKind::Str => slots.str(1).to_string(),
        _ => "0".to_string(),
    };
    host.console.cvars.set(&var.name, &value);
}
