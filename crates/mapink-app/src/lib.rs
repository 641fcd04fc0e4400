//! mapink Application
//!
//! Headless host for the annotation core: replays recorded sessions against
//! a remote store and a logging surface.

pub mod replay;
pub mod script;
pub mod shortcuts;
pub mod surface;

pub use replay::{Replay, ReplaySummary};
pub use script::{Script, ScriptEvent};
pub use shortcuts::ShortcutRegistry;
pub use surface::{LoggingSurface, SurfaceStats};
