//! Page file backends.
//!
//! This module defines the [`DbFile`] trait, the durable backing store the
//! buffer manager reads pages from and writes pages back to, along with two
//! implementations:
//! - [`DiskFile`]: pages stored as contiguous blocks in a single on-disk file
//! - [`MemFile`]: pages held in a map, for tests and ephemeral data
//!
//! A file hands out whole [`Page`]s and accepts them back; it never interprets
//! their contents. All I/O is synchronous and blocks the caller.
//!
//! # File identity
//!
//! The buffer manager caches pages of many files in one pool, so its page
//! table is keyed by `(FileId, PageNo)`. Every file receives a process-unique
//! [`FileId`] at construction, stable for the file's lifetime. Identity is
//! not derived from the path: two handles to the same on-disk file are two
//! distinct files as far as the cache is concerned.

mod disk;
mod memory;

pub use disk::DiskFile;
pub use memory::MemFile;

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::FileError;
use crate::page::{Page, PageNo};

/// Process-unique identity of a file, used as half of the page-table key.
pub type FileId = u64;

/// Shared handle to a file.
///
/// The buffer manager holds clones of this handle in frame descriptors so
/// that an eviction or flush can always reach the owning file; a file
/// therefore outlives every frame binding that references it.
pub type FileRef = Rc<dyn DbFile>;

/// A page file: the durable backing store behind the buffer pool.
///
/// Methods take `&self`; implementations use interior mutability so the
/// manager can drive I/O through shared [`FileRef`]s. The contract is
/// single-threaded.
pub trait DbFile {
    /// Returns the file's process-unique identity.
    fn id(&self) -> FileId;

    /// Returns the file's name, for diagnostics.
    fn name(&self) -> &str;

    /// Reads the page with the given number.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::PageNotFound`] if the page was never allocated or
    /// has been deleted.
    fn read_page(&self, page_no: PageNo) -> Result<Page, FileError>;

    /// Persists the page identified by its embedded page number.
    ///
    /// Writing the same contents twice is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::PageNotFound`] if the page is not allocated.
    fn write_page(&self, page: &Page) -> Result<(), FileError>;

    /// Reserves a fresh page number and returns a zero-initialized page
    /// carrying it.
    fn allocate_page(&self) -> Result<Page, FileError>;

    /// Frees the page with the given number.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::PageNotFound`] if the page is not allocated.
    fn delete_page(&self, page_no: PageNo) -> Result<(), FileError>;
}

/// Hands out process-unique file ids.
pub(crate) fn next_file_id() -> FileId {
    static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PAGE_SIZE;

    /// Contract tests shared by both backends.
    pub(super) fn test_allocate_write_read(file: &dyn DbFile) {
        let page = file.allocate_page().unwrap();
        let page_no = page.page_no();
        assert!(page.as_slice().iter().all(|&b| b == 0));

        let mut page = page;
        page.as_mut_slice()[0] = 0xDE;
        page.as_mut_slice()[PAGE_SIZE - 1] = 0xAD;
        file.write_page(&page).unwrap();

        let back = file.read_page(page_no).unwrap();
        assert_eq!(back.page_no(), page_no);
        assert_eq!(back.as_slice()[0], 0xDE);
        assert_eq!(back.as_slice()[PAGE_SIZE - 1], 0xAD);
    }

    pub(super) fn test_read_unallocated_page_fails(file: &dyn DbFile) {
        let result = file.read_page(999);
        assert!(matches!(result, Err(FileError::PageNotFound { .. })));
    }

    pub(super) fn test_delete_then_read_fails(file: &dyn DbFile) {
        let page = file.allocate_page().unwrap();
        let page_no = page.page_no();

        file.delete_page(page_no).unwrap();
        let result = file.read_page(page_no);
        assert!(matches!(result, Err(FileError::PageNotFound { .. })));

        let result = file.delete_page(page_no);
        assert!(matches!(result, Err(FileError::PageNotFound { .. })));
    }

    #[test]
    fn test_file_ids_are_unique() {
        let a = MemFile::new("a");
        let b = MemFile::new("b");
        assert_ne!(a.id(), b.id());
    }
}
