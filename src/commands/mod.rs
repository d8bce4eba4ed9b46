//! Command implementations
//!
//! Each module corresponds to one mode of the CLI.

pub mod download;
pub mod init_session;
pub mod list_dialogs;

// Re-export commonly used types
pub use download::{download_channel_media, run as download_run, DownloadArgs, DownloadOptions, RunSummary};
pub use list_dialogs::run as list_dialogs_run;
