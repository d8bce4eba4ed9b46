//! `--format` filter: a category name, a literal extension, or nothing.

use std::fmt;

use crate::error::{Error, Result};
use crate::media::{category_extensions, category_names, is_known_extension, TargetName, FILE_CATEGORIES};

/// Category that photos belong to.
pub const PHOTO_CATEGORY: &str = "images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatFilter {
    /// No filter: download every attachment.
    Any,
    /// One of the named categories, stored lowercase.
    Category(String),
    /// A single extension, lowercase and without the leading dot.
    Extension(String),
}

impl FormatFilter {
    /// Parse the raw `--format` value.
    ///
    /// Anything that is neither a category nor an extension listed in some
    /// category is rejected before a connection is opened.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Any);
        };
        let value = raw.to_ascii_lowercase();

        if category_extensions(&value).is_some() {
            return Ok(Self::Category(value));
        }

        let extension = value.trim_start_matches('.');
        if is_known_extension(extension) {
            return Ok(Self::Extension(extension.to_string()));
        }

        Err(Error::InvalidArgument(format!(
            "unsupported format '{}'. {}",
            raw,
            supported_formats_help()
        )))
    }

    /// Whether a photo should be downloaded. Literal extensions never match photos.
    pub fn accepts_photo(&self) -> bool {
        match self {
            Self::Any => true,
            Self::Category(name) => name == PHOTO_CATEGORY,
            Self::Extension(_) => false,
        }
    }

    /// Whether a document with the given resolved extension should be downloaded.
    ///
    /// An unresolved (empty) extension only passes the `Any` filter.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        match self {
            Self::Any => true,
            Self::Category(name) => category_extensions(name)
                .is_some_and(|extensions| extensions.contains(&extension.as_str())),
            Self::Extension(wanted) => !extension.is_empty() && *wanted == extension,
        }
    }

    /// Decide for a classified attachment.
    pub fn accepts(&self, is_photo: bool, target: &TargetName) -> bool {
        if is_photo {
            self.accepts_photo()
        } else {
            self.accepts_extension(&target.extension)
        }
    }
}

impl fmt::Display for FormatFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "all media"),
            Self::Category(name) => write!(f, "category '{}'", name),
            Self::Extension(ext) => write!(f, "extension '.{}'", ext),
        }
    }
}

/// Human-readable list of accepted `--format` values.
pub fn supported_formats_help() -> String {
    let categories: Vec<&str> = category_names().collect();
    let mut help = format!("Supported categories: {}.", categories.join(", "));
    for (name, extensions) in FILE_CATEGORIES {
        help.push_str(&format!("\n  {}: {}", name, extensions.join(", ")));
    }
    help
}
