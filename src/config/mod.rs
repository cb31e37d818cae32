//! Configuration management for Uplift
//!
//! Uplift reads one user-wide TOML file (`~/.uplift/config.toml`). Everything
//! in it is optional, so an absent file behaves like a fully default one.
//!
//! # Modules
//!
//! - `global` - locating, loading and saving the configuration file
//! - `update` - the `[update]` table: repository, validation, timeouts, installer
//!
//! User decisions made at runtime (skipped version, last check time, whether
//! checks are enabled) are not configuration; they live in the preference store,
//! see [`crate::prefs`].

mod global;
mod update;

pub use global::GlobalConfig;
pub use update::UpdateConfig;
