//! Buffer pool errors.

use super::frame::FrameId;
use crate::error::FileError;
use crate::page::PageNo;

/// Errors that can occur during buffer pool operations.
#[derive(Debug)]
pub enum BufferError {
    /// Every frame in the pool is pinned; no victim is available.
    PoolExhausted,

    /// The caller unpinned a page whose frame has no outstanding pins.
    PageNotPinned {
        /// Name of the owning file.
        file: String,
        /// The page's number within the file.
        page_no: PageNo,
        /// The frame holding the page.
        frame_no: FrameId,
    },

    /// A flush found a frame of the target file with outstanding pins.
    ///
    /// Flushing a file that still has pinned pages is a caller programming
    /// error.
    PagePinned {
        /// Name of the owning file.
        file: String,
        /// The page's number within the file.
        page_no: PageNo,
        /// The frame holding the page.
        frame_no: FrameId,
    },

    /// Internal invariant violation: the page table and frame table disagree.
    BadBuffer {
        /// The offending frame.
        frame_no: FrameId,
        /// Whether the frame held a binding.
        valid: bool,
        /// The frame's dirty flag.
        dirty: bool,
        /// The frame's reference bit.
        refbit: bool,
    },

    /// I/O error from the backing file, surfaced unchanged.
    File(FileError),
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::PoolExhausted => {
                write!(f, "buffer pool exhausted: all frames are pinned")
            }
            BufferError::PageNotPinned {
                file,
                page_no,
                frame_no,
            } => {
                write!(
                    f,
                    "page {} of {} in frame {} is not pinned",
                    page_no, file, frame_no
                )
            }
            BufferError::PagePinned {
                file,
                page_no,
                frame_no,
            } => {
                write!(
                    f,
                    "page {} of {} in frame {} is still pinned",
                    page_no, file, frame_no
                )
            }
            BufferError::BadBuffer {
                frame_no,
                valid,
                dirty,
                refbit,
            } => {
                write!(
                    f,
                    "bad buffer state in frame {} (valid={}, dirty={}, refbit={})",
                    frame_no, valid, dirty, refbit
                )
            }
            BufferError::File(e) => write!(f, "file error: {}", e),
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferError::File(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FileError> for BufferError {
    fn from(e: FileError) -> Self {
        BufferError::File(e)
    }
}
