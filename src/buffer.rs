//! Buffer pool for page caching.
//!
//! The buffer pool keeps a fixed number of page-sized frames in memory and
//! caches pages of any number of [`DbFile`](crate::file::DbFile)s in them,
//! evicting with the clock (second-chance) algorithm. Callers pin a page to
//! get a stable reference into the pool and unpin it when done, flagging
//! whether they dirtied it; dirty pages are written back before their frame
//! is reused.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use basalt::buffer::BufferPool;
//! use basalt::file::{FileRef, MemFile};
//!
//! # fn main() -> Result<(), basalt::buffer::BufferError> {
//! let file: FileRef = Rc::new(MemFile::new("example"));
//! let mut pool = BufferPool::new(64);
//!
//! // Allocate a page and write into its frame.
//! let (page_no, page) = pool.alloc_page(&file)?;
//! page.as_mut_slice()[0..5].copy_from_slice(b"hello");
//! pool.unpin_page(&file, page_no, true)?;
//!
//! // Push the change to the file and read it back.
//! pool.flush_file(&file)?;
//! let page = pool.read_page(&file, page_no)?;
//! assert_eq!(&page.as_slice()[0..5], b"hello");
//! pool.unpin_page(&file, page_no, false)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod frame;
mod pool;
mod replacer;
mod table;

pub use error::BufferError;
pub use frame::FrameId;
pub use pool::{BufferPool, PoolConfig};
