//! Telegram Channel Media Downloader Library
//!
//! This library provides tools to:
//! - Scan a channel's history and save photos and documents to disk
//! - Filter attachments by category (images, documents, ...) or extension
//! - Resume safely: files appear under their final name only once complete
//! - List the dialogs visible to the signed-in account

pub mod config;
pub mod download;
pub mod error;
pub mod filter;
pub mod media;
pub mod session;
pub mod source;
pub mod storage;
pub mod telegram;

// Re-export common types
pub use config::Config;
pub use error::{Error, Result};
pub use filter::FormatFilter;
pub use media::MediaKind;
pub use session::{get_client, SessionLock};
pub use source::{ChannelSource, ScannedMessage};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
