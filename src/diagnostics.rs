use crate::console::Console;

/// Console variable holding the most recent script error stack. Tools read
/// it like any other cvar; the runtime never keeps a private copy.
pub const ERROR_STACK_CVAR: &str = "engine.lastErrorStack";

/// One callback from the script engine's error channel. A fault arrives as a
/// burst of reports: located frames and bare continuation lines, terminated
/// by a `StackComplete` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorReport<'a> {
    /// A line tied to a source location.
    Frame { module: &'a str, line: i32, message: &'a str },
    /// A line with no location, printed verbatim.
    Note { message: &'a str },
    /// End of the current trace. Carries no text and writes nothing.
    StackComplete,
}

/// Accumulates script error bursts into [`ERROR_STACK_CVAR`]. The marker arms
/// a latch; the first report of the *next* burst clears the buffer, so the
/// stack stays readable until a new fault overwrites it.
#[derive(Debug)]
pub struct Diagnostics {
    reset_pending: bool,
}

impl Diagnostics {
    /// Starts armed so the first burst writes into an empty buffer.
    pub fn new() -> Self {
        Self { reset_pending: true }
    }

    pub fn report(&mut self, console: &mut Console, report: ErrorReport) {
        if report == ErrorReport::StackComplete {
            self.reset_pending = true;
            return;
        }
        if self.reset_pending {
            console.cvars.set(ERROR_STACK_CVAR, "");
            self.reset_pending = false;
        }

        let line = match report {
            ErrorReport::Frame { module, line, message } => format!("({module}:{line}) {message}"),
            ErrorReport::Note { message } => message.to_string(),
            ErrorReport::StackComplete => unreachable!(),
        };

        let stack = console.cvars.get_or_default(ERROR_STACK_CVAR, "").string.clone();
        let joined = if stack.is_empty() { line.clone() } else { format!("{stack}\n{line}") };
        console.cvars.set(ERROR_STACK_CVAR, &joined);
        console.print(line);
    }

    pub fn last_error_stack<'a>(&self, console: &'a Console) -> &'a str {
        console.cvars.find(ERROR_STACK_CVAR).map_or("", |var| var.string.as_str())
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_accumulate_without_leading_newline() {
        let mut console = Console::default();
        let mut diag = Diagnostics::new();
        diag.report(&mut console, ErrorReport::Frame {
            module: "main",
            line: 12,
            message: "Null does not implement 'update(_)'.",
        });
        diag.report(&mut console, ErrorReport::Note { message: "main.update(_)" });

        assert_eq!(
            diag.last_error_stack(&console),
            "(main:12) Null does not implement 'update(_)'.\nmain.update(_)"
        );
    }

    #[test]
    fn marker_latches_a_reset_for_the_next_burst() {
        let mut console = Console::default();
        let mut diag = Diagnostics::new();

        diag.report(
            &mut console,
            ErrorReport::Frame { module: "main", line: 3, message: "first fault" },
        );
        diag.report(&mut console, ErrorReport::StackComplete);
        // The finished trace is still readable after the marker.
        assert_eq!(diag.last_error_stack(&console), "(main:3) first fault");

        diag.report(&mut console, ErrorReport::Note { message: "second fault" });
        assert_eq!(
            diag.last_error_stack(&console),
            "second fault",
            "new burst replaces the previous stack entirely"
        );
    }

    #[test]
    fn marker_alone_writes_nothing() {
        let mut console = Console::default();
        let mut diag = Diagnostics::new();
        diag.report(&mut console, ErrorReport::StackComplete);
        assert!(console.cvars.find(ERROR_STACK_CVAR).is_none());
        assert_eq!(diag.last_error_stack(&console), "");
    }

    #[test]
    fn reports_mirror_to_the_console_print_ring() {
        let mut console = Console::default();
        let mut diag = Diagnostics::new();
        diag.report(
            &mut console,
            ErrorReport::Frame { module: "game", line: 44, message: "boom" },
        );
        assert_eq!(console.last_line(), Some("(game:44) boom"));
    }
}
