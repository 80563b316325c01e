//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Background;

/// Replace the background of a portrait for a professional profile photo
#[derive(Parser, Debug)]
#[command(name = "profile-photo")]
#[command(version, about = "Swap the background of a profile photo", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove the background of a photo and export the result
    Edit(EditArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct EditArgs {
    /// JPEG or PNG portrait (max 5MB)
    pub input: PathBuf,

    /// Replacement background (default: from config, else white)
    #[arg(long, short)]
    pub background: Option<Background>,

    /// Custom background color as hex, e.g. #1E40AF (implies --background custom)
    #[arg(long)]
    pub color: Option<String>,

    /// Subject zoom in percent (50-150)
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(50..=150))]
    pub zoom: Option<u32>,

    /// Directory to write linkedin-profile-photo.png into
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
