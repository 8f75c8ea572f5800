use std::path::{Path, PathBuf};

use strum_macros::Display;

/// Classification of a record-local failure.
///
/// Every failed record carries exactly one of these; the CLI uses it for the
/// summary table and for the JSON `failed` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    #[strum(to_string = "decode failure")]
    DecodeFailure,
    #[strum(to_string = "stat failure")]
    StatFailure,
    #[strum(to_string = "encode failure")]
    EncodeFailure,
    #[strum(to_string = "write failure")]
    WriteFailure,
}

/// Errors produced while loading, fitting and saving a single animation.
///
/// None of these abort a batch: the engine records them against the record
/// that produced them and moves on to its siblings.
#[derive(thiserror::Error, Debug)]
pub enum FitError {
    /// The source bytes could not be read or are not a valid animation.
    #[error("failed decoding '{}': {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// The original byte size of the source could not be determined.
    #[error("failed reading size of '{}': {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Re-encoding the fitted animation failed.
    #[error("failed encoding: {0}")]
    Encode(String),

    /// Persisting the encoded bytes failed.
    #[error("failed writing '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FitError {
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    /// Attach the record path to a decode error raised without one.
    pub fn at(self, record: &Path) -> Self {
        match self {
            Self::Decode { path, message } if path.as_os_str().is_empty() => Self::Decode {
                path: record.to_path_buf(),
                message,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::DecodeFailure,
            Self::Stat { .. } => ErrorKind::StatFailure,
            Self::Encode(_) => ErrorKind::EncodeFailure,
            Self::Write { .. } => ErrorKind::WriteFailure,
        }
    }
}
