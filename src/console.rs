use std::collections::{BTreeMap, VecDeque};

/// Severity for host-reported errors. `Fatal` aborts the session; `Game`
/// unwinds the current scene; `Drop` is recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Drop,
    Game,
    Fatal,
}

impl ErrorLevel {
    /// Scripts pass the level as a number; anything unrecognized is treated
    /// as fatal so a bad script cannot downgrade an error.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ErrorLevel::Drop,
            1 => ErrorLevel::Game,
            _ => ErrorLevel::Fatal,
        }
    }
}

/// A named configuration variable. The numeric `value` is re-derived from
/// `string` on every write, id-console style.
#[derive(Debug, Clone)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub value: f64,
}

impl Cvar {
    fn new(name: &str, string: &str) -> Self {
        Self { name: name.to_string(), string: string.to_string(), value: parse_value(string) }
    }
}

fn parse_value(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(0.0)
}

/// Ordered store of configuration variables. Scripts hold cvar *names*, not
/// references, so removal between accesses is a normal lookup miss.
#[derive(Default)]
pub struct CvarStore {
    vars: BTreeMap<String, Cvar>,
}

impl CvarStore {
    pub fn get_or_default(&mut self, name: &str, default: &str) -> &Cvar {
        self.vars.entry(name.to_string()).or_insert_with(|| Cvar::new(name, default))
    }

    pub fn find(&self, name: &str) -> Option<&Cvar> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        match self.vars.get_mut(name) {
            Some(var) => {
                var.string = value.to_string();
                var.value = parse_value(value);
            }
            None => {
                self.vars.insert(name.to_string(), Cvar::new(name, value));
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.vars.remove(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRow {
    pub title: String,
    pub key: String,
    pub value: String,
}

/// Host console facade: print mirror, pending command queue, leveled error
/// records, debug overlay rows, and the cvar store.
pub struct Console {
    pub cvars: CvarStore,
    capacity: usize,
    lines: VecDeque<String>,
    commands: VecDeque<String>,
    errors: Vec<(ErrorLevel, String)>,
    overlay: Vec<OverlayRow>,
}

impl Console {
    pub fn new(capacity: usize) -> Self {
        Self {
            cvars: CvarStore::default(),
            capacity: capacity.max(1),
            lines: VecDeque::new(),
            commands: VecDeque::new(),
            errors: Vec::new(),
            overlay: Vec::new(),
        }
    }

    pub fn print(&mut self, message: impl Into<String>) {
        let message = message.into();
        println!("[console] {message}");
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(message);
    }

    pub fn lines(&self) -> impl ExactSizeIterator<Item = &String> {
        self.lines.iter()
    }

    pub fn last_line(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Queues a console command for the host to execute after the script
    /// call returns.
    pub fn send_command(&mut self, command: impl Into<String>) {
        self.commands.push_back(command.into());
    }

    pub fn drain_commands(&mut self) -> Vec<String> {
        self.commands.drain(..).collect()
    }

    pub fn error(&mut self, level: ErrorLevel, message: impl Into<String>) {
        let message = message.into();
        eprintln!("[console] {level:?} error: {message}");
        self.errors.push((level, message));
    }

    pub fn errors(&self) -> &[(ErrorLevel, String)] {
        &self.errors
    }

    pub fn overlay_text(&mut self, title: &str, key: &str, value: &str) {
        self.overlay.push(OverlayRow {
            title: title.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    pub fn overlay_rows(&self) -> &[OverlayRow] {
        &self.overlay
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.clear();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cvar_value_tracks_string_writes() {
        let mut store = CvarStore::default();
        store.get_or_default("vid.scale", "2");
        assert_eq!(store.find("vid.scale").expect("cvar exists").value, 2.0);
        store.set("vid.scale", "3.5");
        assert_eq!(store.find("vid.scale").expect("cvar exists").value, 3.5);
        store.set("vid.scale", "abc");
        assert_eq!(store.find("vid.scale").expect("cvar exists").value, 0.0);
    }

    #[test]
    fn get_or_default_does_not_clobber_existing_value() {
        let mut store = CvarStore::default();
        store.set("engine.tick", "60");
        let var = store.get_or_default("engine.tick", "30");
        assert_eq!(var.string, "60");
    }

    #[test]
    fn print_ring_is_bounded() {
        let mut console = Console::new(2);
        console.print("a");
        console.print("b");
        console.print("c");
        let lines: Vec<_> = console.lines().cloned().collect();
        assert_eq!(lines, vec!["b".to_string(), "c".to_string()]);
    }
}
