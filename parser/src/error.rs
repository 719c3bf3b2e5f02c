use std::fmt;

use thiserror::Error;

/// Top-level sections of a match document, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Players,
    Rounds,
    KillFeed,
    Positions,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Players => "players",
            Section::Rounds => "rounds",
            Section::KillFeed => "kill feed",
            Section::Positions => "positions",
        };
        f.write_str(name)
    }
}

/// Errors raised while loading a match document. All of them are fatal:
/// playback never starts on a document that fails to decode.
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("failed to read match file")]
    Io(#[from] std::io::Error),
    #[error("match file is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("match document must be a JSON array of sections")]
    NotAnArray,
    #[error("match document must be an array of 4 sections, found {found}")]
    SectionCount { found: usize },
    #[error("{section} section must be an object")]
    NotAnObject { section: Section },
    #[error("{section} section has an invalid key {key:?}")]
    InvalidKey { section: Section, key: String },
    #[error("{section} section entry {key:?} is malformed: {reason}")]
    MalformedEntry {
        section: Section,
        key: String,
        reason: String,
    },
}

impl ErrorKind {
    pub(crate) fn malformed(section: Section, key: &str, reason: impl Into<String>) -> Self {
        ErrorKind::MalformedEntry {
            section,
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
