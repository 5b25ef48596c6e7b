//! Configuration data structures for processing runs.

mod settings;

pub use settings::{Settings, SettingsError};
