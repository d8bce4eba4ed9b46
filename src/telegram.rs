//! grammers-backed implementation of [`ChannelSource`] and peer helpers.

use std::path::Path;
use std::sync::LazyLock;

use futures::stream::{self, LocalBoxStream, StreamExt};
use grammers_client::types::peer::Peer;
use grammers_client::types::{Media, Message};
use grammers_client::Client;
use regex::Regex;

use crate::error::{Error, Result};
use crate::media::MediaKind;
use crate::source::{ChannelSource, ScannedMessage};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{2,64}$").expect("valid username pattern"));

/// How the user named the channel on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Username(String),
    /// Raw peer id (the `-100` channel marker already stripped).
    Id(i64),
}

impl ChannelRef {
    /// Accepts `@name`, `name`, `t.me/name` links and numeric ids.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut value = raw.trim();
        for prefix in ["https://", "http://"] {
            value = value.strip_prefix(prefix).unwrap_or(value);
        }
        for prefix in ["www.t.me/", "t.me/", "telegram.me/", "@"] {
            value = value.strip_prefix(prefix).unwrap_or(value);
        }
        let value = value.trim_end_matches('/');

        if let Ok(id) = value.parse::<i64>() {
            let unmarked = value
                .strip_prefix("-100")
                .filter(|rest| !rest.is_empty())
                .and_then(|rest| rest.parse::<i64>().ok())
                .unwrap_or(id.abs());
            return Ok(Self::Id(unmarked));
        }

        if USERNAME_RE.is_match(value) {
            return Ok(Self::Username(value.to_string()));
        }

        Err(Error::InvalidArgument(format!(
            "'{}' is neither a channel username nor a numeric id",
            raw
        )))
    }
}

/// Find the peer for a channel reference.
///
/// Numeric ids are looked up among the account's dialogs.
pub async fn resolve_channel(client: &Client, channel: &ChannelRef) -> Result<Peer> {
    match channel {
        ChannelRef::Username(username) => client
            .resolve_username(username)
            .await?
            .ok_or_else(|| Error::ChatNotFound(format!("@{}", username))),
        ChannelRef::Id(target_id) => {
            let mut dialogs = client.iter_dialogs();
            while let Some(dialog) = dialogs.next().await? {
                if peer_id(&dialog.peer) == *target_id {
                    return Ok(dialog.peer.clone());
                }
            }
            Err(Error::ChatNotFound(format!(
                "{} (not among this account's dialogs)",
                target_id
            )))
        }
    }
}

/// Raw id of a peer, as shown by the dialog listing.
pub fn peer_id(peer: &Peer) -> i64 {
    match peer {
        Peer::Channel(c) => c.raw.id,
        Peer::Group(g) => match &g.raw {
            grammers_tl_types::enums::Chat::Empty(c) => c.id,
            grammers_tl_types::enums::Chat::Chat(c) => c.id,
            grammers_tl_types::enums::Chat::Forbidden(c) => c.id,
            grammers_tl_types::enums::Chat::Channel(c) => c.id,
            grammers_tl_types::enums::Chat::ChannelForbidden(c) => c.id,
        },
        Peer::User(u) => u.raw.id(),
    }
}

/// Entity type label for the dialog listing.
pub fn peer_kind(peer: &Peer) -> &'static str {
    match peer {
        Peer::Channel(_) => "Channel",
        Peer::Group(_) => "Group",
        Peer::User(user) => match &user.raw {
            grammers_tl_types::enums::User::User(u) if u.bot => "Bot",
            _ => "User",
        },
    }
}

/// Display name of a peer, if it has a non-empty one.
pub fn peer_title(peer: &Peer) -> Option<String> {
    let title = match peer {
        Peer::Channel(c) => c.title().to_string(),
        Peer::Group(g) => g.title().unwrap_or_default().to_string(),
        Peer::User(u) => u.full_name(),
    };
    let title = title.trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// Kind of a document-backed attachment from its declared MIME type and name.
pub fn file_kind(mime_type: Option<&str>, name: &str) -> MediaKind {
    let name = name.trim();
    MediaKind::GenericFile {
        mime_type: mime_type.map(str::to_string),
        suggested_name: (!name.is_empty()).then(|| name.to_string()),
    }
}

/// Map an SDK message to the downloader's view of it.
fn scan(message: &Message) -> ScannedMessage<Media> {
    let id = message.id();
    match message.media() {
        Some(Media::Photo(photo)) => ScannedMessage {
            id,
            kind: MediaKind::Photo,
            media: Some(Media::Photo(photo)),
        },
        Some(Media::Document(document)) => ScannedMessage {
            id,
            kind: file_kind(document.mime_type(), document.name()),
            media: Some(Media::Document(document)),
        },
        // stickers are plain documents underneath
        Some(Media::Sticker(sticker)) => ScannedMessage {
            id,
            kind: file_kind(sticker.document.mime_type(), sticker.document.name()),
            media: Some(Media::Sticker(sticker)),
        },
        _ => ScannedMessage::without_media(id),
    }
}

/// Message history of one channel, newest first.
pub struct TelegramChannel {
    client: Client,
    messages: LocalBoxStream<'static, Result<Message>>,
}

impl TelegramChannel {
    pub fn new(client: &Client, peer: &Peer) -> Self {
        let iter = client.iter_messages(peer);
        let messages = stream::unfold(iter, |mut iter| async move {
            match iter.next().await {
                Ok(Some(message)) => Some((Ok(message), iter)),
                Ok(None) => None,
                Err(err) => Some((Err(Error::from(err)), iter)),
            }
        })
        .boxed_local();

        Self {
            client: client.clone(),
            messages,
        }
    }
}

impl ChannelSource for TelegramChannel {
    type Media = Media;

    async fn next_message(&mut self) -> Result<Option<ScannedMessage<Media>>> {
        match self.messages.next().await {
            Some(Ok(message)) => Ok(Some(scan(&message))),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    async fn download_media(&self, media: &Media, path: &Path) -> Result<()> {
        self.client.download_media(media, path).await?;
        Ok(())
    }
}
