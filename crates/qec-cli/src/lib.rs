//! Library half of the `qec` command-line tool.
//!
//! Argument definitions, layered configuration, session handling,
//! histogram rendering and terminal reports live here so they can be tested without spawning the
//! binary. Command execution is in `main.rs` and `commands/`.

pub mod cli;
pub mod config;
pub mod plot;
pub mod report;
pub mod session;

pub use config::{Config, ConfigError};
pub use plot::{ImageFormat, PlotError};
