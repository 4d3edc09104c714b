//! Asset error types
//!
//! Failures while decoding OBJ meshes and TGA images. A loader that returns
//! an error drops whatever it had built so far.

use std::fmt;
use std::io;

/// Error type for asset loading
#[derive(Debug)]
pub enum AssetError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Malformed content; `line` is 1-based for text formats and 0 for binary ones
    Parse { line: usize, message: String },
    /// Well-formed input using a feature outside the supported subset
    Unsupported(String),
}

impl AssetError {
    /// Shorthand for a [`AssetError::Parse`] error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        AssetError::Parse { line, message: message.into() }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io(err) => write!(f, "Asset IO error: {}", err),
            AssetError::Parse { line: 0, message } => write!(f, "Asset parse error: {}", message),
            AssetError::Parse { line, message } => {
                write!(f, "Asset parse error at line {}: {}", line, message)
            }
            AssetError::Unsupported(what) => write!(f, "Unsupported asset feature: {}", what),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AssetError {
    fn from(err: io::Error) -> Self {
        AssetError::Io(err)
    }
}
