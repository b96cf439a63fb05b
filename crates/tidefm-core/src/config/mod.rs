//! Configuration management for TideFM.
//!
//! Settings ([`settings::Config`]) are stored as a TOML file and loaded at
//! startup. Every field has a default, so a missing section is fine.

pub mod settings;

pub use settings::{Config, HistoryConfig, VcsConfig, WatcherConfig};
