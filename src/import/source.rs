//! Import sources and retrieval origins
//!
//! An [`Origin`] identifies where a document was retrieved from. It is the base
//! against which relative `$ref`s inside that document are resolved, and the
//! identity used to detect when two refs point into the same document.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use url::Url;

use super::format::FormatHint;

const REMOTE_TO_LOCAL: &str = "remote document may not reference local files";

/// Raw input for one import action
#[derive(Debug, Clone)]
pub enum RawSpecInput {
    /// Remote document, fetched over HTTP(S) (or a `file://` URL)
    Url(String),
    /// Uploaded file content
    File {
        /// Declared filename; its extension selects the parse order
        filename: String,
        /// File bytes
        bytes: Vec<u8>,
        /// Directory relative external refs resolve against; the filename
        /// itself is used when absent
        base_dir: Option<PathBuf>,
    },
}

impl RawSpecInput {
    /// Whether a command-line style location should be imported as
    /// [`RawSpecInput::Url`] rather than read from disk
    pub fn is_remote_location(location: &str) -> bool {
        location.starts_with("http://")
            || location.starts_with("https://")
            || location.starts_with("file://")
    }

    /// The URL or filename, as given
    pub fn location(&self) -> &str {
        match self {
            RawSpecInput::Url(url) => url,
            RawSpecInput::File { filename, .. } => filename,
        }
    }

    /// Origin of the primary document
    pub fn origin(&self) -> Result<Origin, String> {
        match self {
            RawSpecInput::Url(url) => Origin::parse(url),
            RawSpecInput::File {
                filename, base_dir, ..
            } => {
                let path = match base_dir {
                    Some(dir) => dir.join(filename),
                    None => PathBuf::from(filename),
                };
                Ok(Origin::File(normalize_path(&path)))
            }
        }
    }

    /// Parse-order hint for the primary document
    pub fn format_hint(&self) -> FormatHint {
        match self {
            RawSpecInput::Url(url) => FormatHint::from_url(url),
            RawSpecInput::File { filename, .. } => FormatHint::from_filename(filename),
        }
    }
}

/// Where a document came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Remote document (fragment stripped)
    Url(Url),
    /// Local file (lexically normalized)
    File(PathBuf),
    /// In-memory text with no retrieval location
    Inline,
}

impl Origin {
    /// Parse an absolute location (URL, `file://` URL or filesystem path)
    pub fn parse(location: &str) -> Result<Self, String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let mut url = Url::parse(location)
                .map_err(|e| format!("invalid URL '{}': {}", location, e))?;
            url.set_fragment(None);
            Ok(Origin::Url(url))
        } else if location.starts_with("file://") {
            let url = Url::parse(location)
                .map_err(|e| format!("invalid file URL '{}': {}", location, e))?;
            let path = url
                .to_file_path()
                .map_err(|()| format!("file URL '{}' has no local path", location))?;
            Ok(Origin::File(normalize_path(&path)))
        } else if location.is_empty() {
            Err("empty location".to_string())
        } else {
            Ok(Origin::File(normalize_path(Path::new(location))))
        }
    }

    /// Resolve the document part of a `$ref` against this origin.
    ///
    /// A document fetched over HTTP may only reference other HTTP documents.
    pub fn join(&self, reference: &str) -> Result<Origin, String> {
        if reference.is_empty() {
            return Ok(self.clone());
        }
        if reference.starts_with("http://")
            || reference.starts_with("https://")
            || reference.starts_with("file://")
        {
            let target = Origin::parse(reference)?;
            if matches!(self, Origin::Url(_)) && matches!(target, Origin::File(_)) {
                return Err(REMOTE_TO_LOCAL.to_string());
            }
            return Ok(target);
        }

        match self {
            Origin::Url(base) => {
                let mut url = base
                    .join(reference)
                    .map_err(|e| format!("cannot resolve '{}' against {}: {}", reference, base, e))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(REMOTE_TO_LOCAL.to_string());
                }
                url.set_fragment(None);
                Ok(Origin::Url(url))
            }
            Origin::File(path) => {
                let relative = Path::new(reference);
                if relative.is_absolute() {
                    return Ok(Origin::File(normalize_path(relative)));
                }
                let parent = path.parent().unwrap_or(Path::new(""));
                Ok(Origin::File(normalize_path(&parent.join(relative))))
            }
            Origin::Inline => Ok(Origin::File(normalize_path(Path::new(reference)))),
        }
    }

    /// Parse-order hint derived from the origin's extension
    pub fn format_hint(&self) -> FormatHint {
        match self {
            Origin::Url(url) => FormatHint::from_url(url.as_str()),
            Origin::File(path) => FormatHint::from_filename(&path.to_string_lossy()),
            Origin::Inline => FormatHint::Auto,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Url(url) => write!(f, "{}", url),
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Inline => write!(f, "<inline document>"),
        }
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding segment. The filesystem is not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                normalized.push(component.as_os_str());
                depth = 0;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(segment) => {
                normalized.push(segment);
                depth += 1;
            }
        }
    }

    normalized
}
