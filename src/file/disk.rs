//! Disk-backed page file.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{next_file_id, DbFile, FileId};
use crate::error::FileError;
use crate::page::{Page, PageNo, PAGE_SIZE};

/// Disk-backed page file.
///
/// Pages are stored as contiguous `PAGE_SIZE` blocks:
///
/// ```text
/// +------------------+------------------+------------------+
/// | Page 0 (8KB)     | Page 1 (8KB)     | Page 2 (8KB)     | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ offset 8192      ^ offset 16384
/// ```
///
/// Deleted page numbers go into a free set and are handed out again by
/// [`allocate_page`](DbFile::allocate_page), lowest number first; their slots
/// are zeroed on reuse. The free set is kept in memory only.
pub struct DiskFile {
    id: FileId,
    name: String,
    path: PathBuf,
    file: RefCell<File>,
    page_count: Cell<PageNo>,
    freed: RefCell<BTreeSet<PageNo>>,
}

impl DiskFile {
    /// Opens or creates a page file at the given path.
    ///
    /// If the file exists, its page count is derived from its length.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Corrupted`] if the file length is not a whole
    /// number of pages.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let len = file.metadata()?.len();
        if len % PAGE_SIZE as u64 != 0 {
            return Err(FileError::Corrupted(format!(
                "file length {} is not a multiple of page size {}",
                len, PAGE_SIZE
            )));
        }

        Ok(Self {
            id: next_file_id(),
            name: path.display().to_string(),
            path,
            file: RefCell::new(file),
            page_count: Cell::new((len / PAGE_SIZE as u64) as PageNo),
            freed: RefCell::new(BTreeSet::new()),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of page slots in the file, deleted pages included.
    pub fn page_count(&self) -> PageNo {
        self.page_count.get()
    }

    fn is_allocated(&self, page_no: PageNo) -> bool {
        page_no < self.page_count.get() && !self.freed.borrow().contains(&page_no)
    }

    fn not_found(&self, page_no: PageNo) -> FileError {
        FileError::PageNotFound {
            file: self.name.clone(),
            page_no,
        }
    }

    fn byte_offset(page_no: PageNo) -> u64 {
        page_no as u64 * PAGE_SIZE as u64
    }

    /// Writes a zeroed block at the page's slot.
    fn zero_slot(&self, page_no: PageNo) -> Result<(), FileError> {
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(Self::byte_offset(page_no)))?;
        file.write_all(&[0u8; PAGE_SIZE])?;
        Ok(())
    }
}

impl DbFile for DiskFile {
    fn id(&self) -> FileId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&self, page_no: PageNo) -> Result<Page, FileError> {
        if !self.is_allocated(page_no) {
            return Err(self.not_found(page_no));
        }

        let mut page = Page::new(page_no);
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(Self::byte_offset(page_no)))?;
        file.read_exact(page.as_mut_slice())?;
        Ok(page)
    }

    fn write_page(&self, page: &Page) -> Result<(), FileError> {
        if !self.is_allocated(page.page_no()) {
            return Err(self.not_found(page.page_no()));
        }

        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(Self::byte_offset(page.page_no())))?;
        file.write_all(page.as_slice())?;
        Ok(())
    }

    fn allocate_page(&self) -> Result<Page, FileError> {
        // Reuse the lowest freed slot before growing the file.
        let page_no = match self.freed.borrow_mut().pop_first() {
            Some(no) => no,
            None => self.page_count.get(),
        };

        self.zero_slot(page_no)?;
        if page_no == self.page_count.get() {
            self.page_count.set(page_no + 1);
        }
        Ok(Page::new(page_no))
    }

    fn delete_page(&self, page_no: PageNo) -> Result<(), FileError> {
        if !self.is_allocated(page_no) {
            return Err(self.not_found(page_no));
        }
        self.freed.borrow_mut().insert(page_no);
        Ok(())
    }
}
