pub mod api;
pub mod assets;
pub mod audio;
pub mod config;
pub mod console;
pub mod diagnostics;
pub mod dispatch;
pub mod draw;
pub mod foreign;
pub mod harness;
pub mod host;
pub mod input;
pub mod projector;
pub mod runtime;
pub mod slots;
pub mod tilemap;

pub use config::RuntimeConfig;
pub use host::Host;
pub use runtime::{LifecycleState, ScriptEngine, ScriptRuntime};
pub use slots::{SlotStack, Value, ValueKind};
