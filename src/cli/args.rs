//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scene-aware camera capture: detects the scene, suggests settings, saves photos
#[derive(Parser, Debug)]
#[command(name = "scene-cam")]
#[command(version)]
#[command(about = "Scene-aware camera capture with AI scene detection and shooting guidance", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Image file or directory to use as the camera feed, or "mock" (overrides config)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Gallery directory for saved photos (overrides config)
    #[arg(short, long, global = true)]
    pub gallery: Option<PathBuf>,

    /// Camera to open first: rear or front (overrides config)
    #[arg(short, long, global = true)]
    pub facing: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a live capture session and print what happens
    Run {
        /// Start in manual mode (no scene detection)
        #[arg(long)]
        manual: bool,

        /// Stop after this many seconds (runs until Ctrl+C otherwise)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Take a photo every N seconds
        #[arg(long, value_name = "SECONDS")]
        capture_every: Option<u64>,
    },

    /// Classify a single image and show the suggested settings
    Classify {
        /// Image to classify
        image: PathBuf,
    },

    /// Take one photo with a chosen scene's settings
    Capture {
        /// Scene to use (auto, portrait, landscape, night, food, macro, sport, document)
        #[arg(long, default_value = "auto")]
        scene: String,

        /// Use the front camera (the photo is mirrored)
        #[arg(long)]
        front: bool,
    },

    /// List the scene catalog
    Scenes,

    /// Browse and manage saved photos (lists them by default)
    Gallery {
        #[command(subcommand)]
        gallery_command: Option<GalleryCommands>,
    },

    /// Group saved photos into albums
    Album {
        #[command(subcommand)]
        album_command: AlbumCommands,
    },

    /// Show or create the configuration file
    ///
    /// The config file is stored at:
    /// - Windows: %APPDATA%\scene_cam\config.toml
    /// - Linux/macOS: ~/.config/scene_cam/config.toml
    ///
    /// If no config file exists, a default one will be created.
    Config {
        /// Show the config file path only
        #[arg(long)]
        path: bool,

        /// Reset config to defaults (overwrites the config file)
        #[arg(long)]
        reset: bool,
    },

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current configuration
    ShowConfig,
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommands {
    /// List saved photos, newest first
    List {
        /// Show at most this many photos
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Only photos taken with this scene
        #[arg(long)]
        scene: Option<String>,

        /// List the trash instead
        #[arg(long)]
        trash: bool,
    },

    /// Move photos to the trash (they can be restored)
    Trash {
        /// Photo ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Take photos back out of the trash
    Restore {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete photos for good, trashed or not
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Permanently delete everything in the trash
    EmptyTrash,

    /// Change a photo's scene tag or location
    Retag {
        /// Photo id
        id: String,

        /// New scene tag
        #[arg(long)]
        scene: Option<String>,

        /// New location as LAT,LON
        #[arg(long, value_name = "LAT,LON", conflicts_with = "clear_location")]
        location: Option<String>,

        /// Remove the stored location
        #[arg(long)]
        clear_location: bool,
    },

    /// Show disk use against the storage quota
    Usage,
}

#[derive(Subcommand, Debug)]
pub enum AlbumCommands {
    /// List albums in display order
    List,

    /// Create an empty album
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show an album and its photos
    Show {
        /// Album id
        album: String,
    },

    /// Add photos to an album
    Add {
        album: String,

        /// Photo ids
        #[arg(required = true)]
        photos: Vec<String>,
    },

    /// Take a photo out of an album (the photo stays in the gallery)
    Remove { album: String, photo: String },

    /// Use one of the album's photos as its cover
    Cover { album: String, photo: String },

    /// Rename an album or change its description
    Edit {
        album: String,

        #[arg(long)]
        name: Option<String>,

        /// New description ("" clears it)
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an album (its photos stay in the gallery)
    Delete { album: String },

    /// Put these albums first, in this order
    Order {
        #[arg(required = true, value_delimiter = ',')]
        albums: Vec<String>,
    },
}
