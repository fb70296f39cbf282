use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid UTF-8 input: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
    #[error("Unable to read any of the environment file(s) at [{}].", join_paths(.paths))]
    InvalidPath { paths: Vec<PathBuf> },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A malformed line, with the exact input fragment that was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Failed to parse dotenv file due to {kind}. Failed at [{fragment}]{}.",
    location_suffix(.line, .path)
)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub fragment: String,
    /// First physical line of the offending entry, when known.
    pub line: Option<u32>,
    /// File the entry was read from; `None` for in-memory content.
    pub path: Option<PathBuf>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, fragment: impl Into<String>) -> Self {
        Self {
            kind,
            fragment: fragment.into(),
            line: None,
            path: None,
        }
    }

    pub(crate) fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub(crate) fn in_file(mut self, path: Option<&Path>) -> Self {
        self.path = path.map(Path::to_path_buf);
        self
    }
}

fn location_suffix(line: &Option<u32>, path: &Option<PathBuf>) -> String {
    match (line, path) {
        (Some(line), Some(path)) => format!(" (line {line} in {})", path.display()),
        (Some(line), None) => format!(" (line {line})"),
        (None, Some(path)) => format!(" (in {})", path.display()),
        (None, None) => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    StrayEquals,
    InvalidName,
    InvalidSpaces,
    UnexpectedEscapeSequence,
    MissingClosingQuote,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrayEquals => write!(f, "an unexpected equals"),
            Self::InvalidName => write!(f, "an invalid name"),
            Self::InvalidSpaces => write!(f, "unexpected whitespace"),
            Self::UnexpectedEscapeSequence => write!(f, "an unexpected escape sequence"),
            Self::MissingClosingQuote => write!(f, "a missing closing quote"),
        }
    }
}

/// Failed variable assertions, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("One or more environment variables failed assertions: {}.", join_failures(.failures))]
pub struct ValidationError {
    pub failures: Vec<String>,
}

fn join_failures(failures: &[String]) -> String {
    failures.join(", ")
}
