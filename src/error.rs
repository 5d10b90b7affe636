//! Error types for decoding and encoding playlists.

use std::io;
use thiserror::Error;

/// Result type for playlist operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for playlist operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is empty or does not start with `#EXTM3U`.
    #[error("not a valid M3U8 playlist: {0}")]
    InvalidPlaylist(String),

    /// The input is a well-formed playlist of a kind that cannot be decoded.
    #[error("unsupported playlist type: {0}")]
    UnsupportedPlaylist(String),

    /// A `count[@offset]` byte range could not be parsed.
    #[error("invalid byterange format: {0:?}")]
    MalformedByteRange(String),

    /// A numeric tag value could not be parsed. Only returned in strict mode.
    #[error("malformed value for #{tag}: {value:?}")]
    MalformedField { tag: String, value: String },

    /// The timeline to encode has no tracks.
    #[error("timeline has no tracks")]
    NoTracks,

    /// A typed attribute lookup failed.
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of a typed [`AttributeList`](crate::attributes::AttributeList) accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("attribute {0} not found")]
    Missing(String),

    #[error("attribute {name} has malformed value {value:?}")]
    Malformed { name: String, value: String },
}

impl Error {
    pub(crate) fn invalid_playlist(msg: impl Into<String>) -> Self {
        Self::InvalidPlaylist(msg.into())
    }

    pub(crate) fn malformed_field(tag: &str, value: &str) -> Self {
        Self::MalformedField {
            tag: tag.to_string(),
            value: value.to_string(),
        }
    }
}
