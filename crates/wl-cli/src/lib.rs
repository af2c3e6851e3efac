//! Worklink CLI library.
//!
//! This crate provides the command-line interface over `wl-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{AnalyzeArgs, Cli, Commands, RecordArgs};
pub use config::Config;
