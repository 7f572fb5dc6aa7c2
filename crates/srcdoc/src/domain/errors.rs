//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while pulling a source file into the document.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read source file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("source file {} is not valid UTF-8", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error(
        "source file {} contains {character:?} at line {line}, which a word-processing document cannot hold",
        .path.display()
    )]
    UnsupportedCharacter {
        path: PathBuf,
        character: char,
        line: usize,
    },
}

/// Rejected code style attributes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("invalid {attribute} color '{value}': expected six hexadecimal digits")]
    InvalidColor {
        attribute: &'static str,
        value: String,
    },
    #[error("font size must be positive")]
    InvalidSize,
    #[error("font family must not be empty")]
    EmptyFont,
}
