//! File layer errors.

use crate::page::PageNo;

/// Errors raised by the file layer.
#[derive(Debug)]
pub enum FileError {
    /// The page number does not refer to an allocated page of the file.
    ///
    /// Raised when reading, writing, or deleting a page that was never
    /// allocated, or that has already been deleted.
    PageNotFound {
        /// Name of the file, for diagnostics.
        file: String,
        /// The offending page number.
        page_no: PageNo,
    },

    /// I/O error from the underlying file system.
    Io(std::io::Error),

    /// The on-disk file does not have a valid layout.
    ///
    /// Raised at open time when the file length is not a whole number of
    /// pages.
    Corrupted(String),
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::PageNotFound { file, page_no } => {
                write!(f, "page {} not found in file {}", page_no, file)
            }
            FileError::Io(e) => write!(f, "I/O error: {}", e),
            FileError::Corrupted(msg) => write!(f, "corrupted file: {}", msg),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FileError {
    fn from(e: std::io::Error) -> Self {
        FileError::Io(e)
    }
}
