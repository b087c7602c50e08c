use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtransError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed subtitle block {block}: expected at least 3 lines, found {lines}")]
    MalformedBlock { block: usize, lines: usize },

    #[error("Response rejected: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Gave up on entries {start}..{end} after {attempts} attempts")]
    RetriesExhausted {
        start: usize,
        end: usize,
        attempts: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Structural reasons a backend response is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("tags are not closed ({open} <i>, {close} </i>)")]
    UnbalancedTags { open: usize, close: usize },

    #[error("expected {expected} segments, got {actual}")]
    SegmentCount { expected: usize, actual: usize },

    #[error("segment {position} is empty")]
    EmptySegment { position: usize },

    #[error("response contains forbidden character {0:?}")]
    ForbiddenToken(char),
}

pub type Result<T> = std::result::Result<T, SubtransError>;
