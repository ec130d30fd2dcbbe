//! CLI entry point for meetai.

pub mod auth;
pub mod upload;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::drive::FolderLookup;

/// meetai CLI
#[derive(Parser, Debug)]
#[command(name = "meetai", version, about = "Record meetings into a OneDrive folder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Upload an existing audio file
    Upload(UploadArgs),
    /// Record from the microphone until Enter is pressed, then upload
    Record(RecordArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with a device code
    Login,
    /// Show the cached sign-in
    Status,
    /// Forget the cached sign-in
    Logout,
}

/// Destination options shared by `upload` and `record`.
#[derive(Parser, Debug, Default)]
pub struct DestinationArgs {
    /// Folder at the drive root (default: AudioParaTranscribir)
    #[arg(short, long)]
    pub folder: Option<String>,

    /// Folder lookup strategy (direct_path, listing)
    #[arg(long)]
    pub lookup: Option<FolderLookup>,
}

/// Arguments for `meetai upload`.
#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Audio file to upload
    pub path: PathBuf,

    #[command(flatten)]
    pub destination: DestinationArgs,
}

/// Arguments for `meetai record`.
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Input device name (default: system default input)
    #[arg(short, long)]
    pub device: Option<String>,

    #[command(flatten)]
    pub destination: DestinationArgs,
}
