//! Service adapters: concrete host, diff engine, prompts and settings IO.

pub mod line_diff;
pub mod memory_host;
pub mod prompt;
pub mod settings;

pub use line_diff::LineDiffEngine;
pub use memory_host::MemoryHost;
pub use prompt::ScriptedPrompt;
pub use settings::{
    ensure_log_dir, get_log_dir, get_settings_path, load_config, load_config_from, parse_config,
    ConfigError,
};
