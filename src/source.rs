//! The boundary between the download loop and the messaging SDK.

use std::path::Path;

use crate::error::Result;
use crate::media::MediaKind;

/// One message from a channel's history, reduced to what the downloader needs.
#[derive(Debug, Clone)]
pub struct ScannedMessage<H> {
    pub id: i32,
    pub kind: MediaKind,
    /// SDK handle passed back to [`ChannelSource::download_media`].
    pub media: Option<H>,
}

impl<H> ScannedMessage<H> {
    pub fn without_media(id: i32) -> Self {
        Self {
            id,
            kind: MediaKind::None,
            media: None,
        }
    }
}

/// A channel's message history plus the primitive that saves an attachment.
///
/// Messages come newest first; the sequence is finite and read once.
#[allow(async_fn_in_trait)]
pub trait ChannelSource {
    type Media;

    /// Next message, or `None` when the history is exhausted.
    async fn next_message(&mut self) -> Result<Option<ScannedMessage<Self::Media>>>;

    /// Write the attachment to `path`.
    async fn download_media(&self, media: &Self::Media, path: &Path) -> Result<()>;
}
