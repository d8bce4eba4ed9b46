//! Media classification and target file naming
//!
//! Messages carry either a photo, a generic file (document) or nothing we
//! can download. Photos are always saved as `<message id>.jpg`; documents keep
//! the name suggested by the sender, with an extension derived from the
//! declared MIME type appended when missing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::storage::TEMP_SUFFIX;

/// Extension given to every downloaded photo.
pub const PHOTO_EXTENSION: &str = ".jpg";

/// Named groups of extensions usable as a `--format` shorthand.
pub const FILE_CATEGORIES: &[(&str, &[&str])] = &[
    ("images", &["jpg", "jpeg", "png", "gif", "bmp"]),
    ("documents", &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"]),
    ("videos", &["mp4", "mkv", "avi", "mov", "wmv"]),
    ("audios", &["mp3", "wav", "aac", "flac", "ogg"]),
    ("archives", &["zip", "rar", "7z", "tar", "gz"]),
];

/// Preferred extension for MIME types where the guess database has several candidates.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/pjpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/bmp", "bmp"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/tiff", "tiff"),
    ("application/pdf", "pdf"),
    ("application/msword", "doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    ("application/vnd.ms-excel", "xls"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xlsx",
    ),
    ("application/vnd.ms-powerpoint", "ppt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "pptx",
    ),
    ("video/mp4", "mp4"),
    ("video/x-matroska", "mkv"),
    ("video/x-msvideo", "avi"),
    ("video/quicktime", "mov"),
    ("video/x-ms-wmv", "wmv"),
    ("video/webm", "webm"),
    ("video/mpeg", "mpeg"),
    ("audio/mpeg", "mp3"),
    ("audio/mp3", "mp3"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/aac", "aac"),
    ("audio/flac", "flac"),
    ("audio/x-flac", "flac"),
    ("audio/ogg", "ogg"),
    ("audio/opus", "opus"),
    ("audio/mp4", "m4a"),
    ("audio/x-m4a", "m4a"),
    ("application/zip", "zip"),
    ("application/x-zip-compressed", "zip"),
    ("application/vnd.rar", "rar"),
    ("application/x-rar-compressed", "rar"),
    ("application/x-7z-compressed", "7z"),
    ("application/x-tar", "tar"),
    ("application/gzip", "gz"),
    ("application/x-gzip", "gz"),
    ("text/plain", "txt"),
    ("text/html", "html"),
    ("application/octet-stream", "bin"),
];

/// Characters that must not reach the file system from a sender-supplied name.
static UNSAFE_NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\x00-\x1f\x7f/\\:*?"<>|]"#).expect("valid unsafe-name pattern")
});

/// What a message carries, as far as downloading is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    GenericFile {
        mime_type: Option<String>,
        suggested_name: Option<String>,
    },
    None,
}

impl MediaKind {
    pub fn has_media(&self) -> bool {
        !matches!(self, MediaKind::None)
    }
}

/// Resolved name for one downloadable attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetName {
    /// Extension with a leading dot, or empty when it could not be resolved.
    pub extension: String,
    pub file_name: String,
}

impl TargetName {
    /// Extension without the leading dot, lowercase.
    pub fn bare_extension(&self) -> String {
        self.extension.trim_start_matches('.').to_ascii_lowercase()
    }

    pub fn path_in(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.file_name)
    }
}

/// Look up a category's extensions by (case-insensitive) name.
pub fn category_extensions(name: &str) -> Option<&'static [&'static str]> {
    let name = name.to_ascii_lowercase();
    FILE_CATEGORIES
        .iter()
        .find(|(category, _)| *category == name)
        .map(|(_, extensions)| *extensions)
}

/// All category names, in declaration order.
pub fn category_names() -> impl Iterator<Item = &'static str> {
    FILE_CATEGORIES.iter().map(|(name, _)| *name)
}

/// True if any category lists this extension.
pub fn is_known_extension(extension: &str) -> bool {
    let extension = extension.to_ascii_lowercase();
    FILE_CATEGORIES
        .iter()
        .any(|(_, extensions)| extensions.contains(&extension.as_str()))
}

/// Best-effort extension for a MIME type, with a leading dot.
///
/// Returns an empty string for absent or unrecognised types.
pub fn extension_for_mime(mime_type: Option<&str>) -> String {
    let Some(mime_type) = mime_type else {
        return String::new();
    };
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence.is_empty() {
        return String::new();
    }

    if let Some((_, ext)) = PREFERRED_EXTENSIONS.iter().find(|(mime, _)| *mime == essence) {
        return format!(".{}", ext);
    }

    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|extensions| extensions.first())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Reduce a sender-supplied file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let last_component = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_NAME_CHARS.replace_all(last_component, "_");
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Work out the file name and extension a message's media should be saved under.
///
/// Returns `None` for messages without downloadable media.
pub fn resolve_target(message_id: i32, kind: &MediaKind) -> Option<TargetName> {
    match kind {
        MediaKind::Photo => Some(TargetName {
            extension: PHOTO_EXTENSION.to_string(),
            file_name: format!("{}{}", message_id, PHOTO_EXTENSION),
        }),
        MediaKind::GenericFile {
            mime_type,
            suggested_name,
        } => {
            let extension = extension_for_mime(mime_type.as_deref());
            let mut file_name = suggested_name
                .as_deref()
                .and_then(sanitize_file_name)
                .unwrap_or_else(|| message_id.to_string());

            if !extension.is_empty()
                && !file_name
                    .to_ascii_lowercase()
                    .ends_with(&extension.to_ascii_lowercase())
            {
                file_name.push_str(&extension);
            }
            // a final name must never look like an interrupted download
            if file_name.ends_with(TEMP_SUFFIX) {
                file_name.push('_');
            }

            Some(TargetName {
                extension,
                file_name,
            })
        }
        MediaKind::None => None,
    }
}
