//! Configuration management for portsweep.
//!
//! Settings come from an optional JSON file; command-line flags override them.

mod settings;

pub use settings::{default_settings_path, Settings};
