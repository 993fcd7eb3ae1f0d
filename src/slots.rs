use std::cell::RefCell;
use std::rc::Rc;

use crate::foreign::ForeignCell;

/// Runtime type of a VM slot, as reported to scripts and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Num,
    Foreign,
    List,
    Null,
    Str,
    Map,
    Unknown,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "Bool",
            ValueKind::Num => "Num",
            ValueKind::Foreign => "Foreign",
            ValueKind::List => "List",
            ValueKind::Null => "Null",
            ValueKind::Str => "String",
            ValueKind::Map => "Map",
            ValueKind::Unknown => "Unknown",
        }
    }
}

/// A dynamically-typed VM value. `Instance` pins an engine-side object behind
/// an opaque id; slots never see the object itself.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Value>),
    Map(ValueMap),
    Foreign(Rc<RefCell<ForeignCell>>),
    Instance(u64),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Num(_) => ValueKind::Num,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Foreign(_) => ValueKind::Foreign,
            Value::Instance(_) => ValueKind::Unknown,
        }
    }

    /// Key equality for map inserts. Only value types compare equal; lists,
    /// maps, and foreign objects are identity-keyed and never match here.
    fn key_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

/// Insertion-ordered map with last-write-wins semantics: inserting an
/// existing key overwrites its value in place.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
}

impl ValueMap {
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.key_eq(&key)) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k.key_eq(key)).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.get(&Value::Str(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }
}

/// Positionally-addressed value registers shared between the VM and native
/// trampolines. Slot 0 is the return slot; slots 1..N carry call arguments.
#[derive(Default)]
pub struct SlotStack {
    slots: Vec<Value>,
}

impl SlotStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grows the register file so slots `0..n` are addressable. New slots
    /// read as null.
    pub fn ensure(&mut self, n: usize) {
        if self.slots.len() < n {
            self.slots.resize(n, Value::Null);
        }
    }

    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every slot. The runtime resets between entry-point calls so one
    /// call's registers never leak into the next.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    pub fn kind(&self, slot: usize) -> ValueKind {
        self.slots.get(slot).map_or(ValueKind::Null, Value::kind)
    }

    pub fn get(&self, slot: usize) -> &Value {
        const NULL: &Value = &Value::Null;
        self.slots.get(slot).unwrap_or(NULL)
    }

    pub fn bool(&self, slot: usize) -> bool {
        match self.get(slot) {
            Value::Bool(b) => *b,
            _ => false,
        }
    }

    pub fn num(&self, slot: usize) -> f64 {
        match self.get(slot) {
            Value::Num(n) => *n,
            _ => 0.0,
        }
    }

    pub fn str(&self, slot: usize) -> &str {
        match self.get(slot) {
            Value::Str(s) => s.as_str(),
            _ => "",
        }
    }

    pub fn set(&mut self, slot: usize, value: Value) {
        self.ensure(slot + 1);
        self.slots[slot] = value;
    }

    pub fn set_null(&mut self, slot: usize) {
        self.set(slot, Value::Null);
    }

    pub fn set_bool(&mut self, slot: usize, value: bool) {
        self.set(slot, Value::Bool(value));
    }

    pub fn set_num(&mut self, slot: usize, value: f64) {
        self.set(slot, Value::Num(value));
    }

    pub fn set_str(&mut self, slot: usize, value: impl Into<String>) {
        self.set(slot, Value::Str(value.into()));
    }

    pub fn new_list(&mut self, slot: usize) {
        self.set(slot, Value::List(Vec::new()));
    }

    pub fn new_map(&mut self, slot: usize) {
        self.set(slot, Value::Map(ValueMap::default()));
    }

    /// Copies the value in `from` into the list at `list_slot`. `index` of -1
    /// appends; any other index inserts before that position.
    pub fn insert_in_list(&mut self, list_slot: usize, index: isize, from: usize) {
        let value = self.get(from).clone();
        if let Some(Value::List(items)) = self.slots.get_mut(list_slot) {
            if index < 0 || index as usize >= items.len() {
                items.push(value);
            } else {
                items.insert(index as usize, value);
            }
        }
    }

    pub fn list_count(&self, slot: usize) -> usize {
        match self.get(slot) {
            Value::List(items) => items.len(),
            _ => 0,
        }
    }

    /// Copies list element `index` into `dest`. Out-of-range reads leave a
    /// null in the destination.
    pub fn get_list_element(&mut self, list_slot: usize, index: usize, dest: usize) {
        let value = match self.get(list_slot) {
            Value::List(items) => items.get(index).cloned().unwrap_or_default(),
            _ => Value::Null,
        };
        self.set(dest, value);
    }

    /// Copies the key/value pair held in two slots into the map at
    /// `map_slot`. Duplicate keys overwrite the earlier value (last write
    /// wins).
    pub fn insert_in_map(&mut self, map_slot: usize, key_slot: usize, value_slot: usize) {
        let key = self.get(key_slot).clone();
        let value = self.get(value_slot).clone();
        if let Some(Value::Map(map)) = self.slots.get_mut(map_slot) {
            map.insert(key, value);
        }
    }

    /// Allocates a fresh foreign wrapper in `slot` and returns a shared
    /// reference to its cell.
    pub fn set_foreign(&mut self, slot: usize, cell: ForeignCell) -> Rc<RefCell<ForeignCell>> {
        let cell = Rc::new(RefCell::new(cell));
        self.set(slot, Value::Foreign(Rc::clone(&cell)));
        cell
    }

    pub fn foreign(&self, slot: usize) -> Option<Rc<RefCell<ForeignCell>>> {
        match self.get(slot) {
            Value::Foreign(cell) => Some(Rc::clone(cell)),
            _ => None,
        }
    }

    pub fn list(&self, slot: usize) -> Option<&[Value]> {
        match self.get(slot) {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn map(&self, slot: usize) -> Option<&ValueMap> {
        match self.get(slot) {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}
