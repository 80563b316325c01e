//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction, EditArgs};
pub use commands::{handle_config_action, handle_edit, init_config, run_edit, EditPlan};
pub use enums::Background;
