//! CLI module for scene_cam
//!
//! This module contains all command-line interface related code including
//! argument parsing, command definitions, and command handlers.
//!
//! # Submodules
//!
//! - `args` - Command-line argument definitions using clap
//! - `commands` - Command handler implementations
//! - `progress` - Spinners and CLI output utilities

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{AlbumCommands, Args, Commands, GalleryCommands};
pub use commands::run_command;
pub use progress::DualWriter;
