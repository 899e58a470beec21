//! Service ports: traits + data contracts.

pub mod config;
pub mod diff;
pub mod host;
pub mod notification;
pub mod prompt;

pub use config::{CompareConfig, TimingConfig};
pub use diff::{CompareOptions, CompareResult, DiffEngine, DiffReport};
pub use host::{DocumentControl, EditorHost, HostShell, LineMarkers, ViewMarkers};
pub use notification::{Modification, ModificationKind, Notification};
pub use prompt::{Notice, Question, UserPrompt};
