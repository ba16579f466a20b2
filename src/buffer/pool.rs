//! Buffer pool manager: the public face of the page cache.
//!
//! The pool owns a fixed array of page-sized frames and mediates every read
//! and write the rest of the system performs against its files.
//!
//! ```text
//! +--------------------+
//! |   Higher layers    |
//! +--------------------+
//!          |  read_page / unpin_page / alloc_page / ...
//!          v
//! +--------------------+     +--------------------+
//! |     BufferPool     |---->| PageTable          |
//! | frames + pages     |     | (file, page) ->    |
//! | clock sweep        |     | frame              |
//! +--------------------+     +--------------------+
//!          |
//!          v
//! +--------------------+
//! |  DbFile (trait)    |
//! +--------------------+
//! ```

use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

use super::error::BufferError;
use super::frame::{FrameDesc, FrameId};
use super::replacer::Clock;
use super::table::PageTable;
use crate::file::{DbFile, FileRef};
use crate::page::{Page, PageNo};

/// Configuration for a buffer pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of frames in the pool.
    ///
    /// This bounds how many pages can be cached at once. Common values:
    /// - 128 frames = 1MB (testing)
    /// - 1024 frames = 8MB (small database)
    /// - 131072 frames = 1GB (production)
    pub num_bufs: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { num_bufs: 1024 }
    }
}

/// Page-level buffer pool with clock replacement.
///
/// The pool caches pages of any number of files, keyed by `(file, page)`.
/// Callers obtain a reference into the pool with [`read_page`] or
/// [`alloc_page`]; each call pins the frame once, and the frame cannot be
/// evicted until every pin is returned through [`unpin_page`]. The frame
/// array is allocated at construction and never reallocated, so a pinned
/// page's slot is stable for as long as the pin is held.
///
/// All operations take `&mut self`: the pool is built for a single logical
/// caller and has no internal locking. A multi-threaded host wraps the whole
/// pool in one mutex.
///
/// Dropping the pool does **not** write anything back; dirty pages still
/// cached at drop are lost. Call [`flush_file`] for every file whose changes
/// must reach disk first.
///
/// [`read_page`]: BufferPool::read_page
/// [`alloc_page`]: BufferPool::alloc_page
/// [`unpin_page`]: BufferPool::unpin_page
/// [`flush_file`]: BufferPool::flush_file
pub struct BufferPool {
    /// Frame descriptors, index-aligned with `pages`.
    frames: Vec<FrameDesc>,
    /// The page slots themselves. Fixed length, never reallocated.
    pages: Vec<Page>,
    /// Maps resident `(file, page)` pairs to their frame.
    table: PageTable,
    /// Clock hand and sweep state.
    clock: Clock,
}

impl BufferPool {
    /// Creates a pool with `num_bufs` frames.
    ///
    /// # Panics
    ///
    /// Panics if `num_bufs` is 0.
    pub fn new(num_bufs: u32) -> Self {
        Self::with_config(PoolConfig { num_bufs })
    }

    /// Creates a pool from a [`PoolConfig`].
    ///
    /// # Panics
    ///
    /// Panics if the configured frame count is 0.
    pub fn with_config(config: PoolConfig) -> Self {
        let num_bufs = config.num_bufs as usize;
        assert!(num_bufs > 0, "num_bufs must be > 0");

        Self {
            frames: (0..num_bufs).map(FrameDesc::new).collect(),
            pages: (0..num_bufs).map(|_| Page::new(0)).collect(),
            table: PageTable::with_capacity(num_bufs),
            clock: Clock::new(num_bufs),
        }
    }

    /// Returns a pinned reference to the page's frame, loading the page from
    /// its file if it is not resident.
    ///
    /// Every successful call adds exactly one pin; the caller owes a matching
    /// [`unpin_page`](BufferPool::unpin_page). The returned reference is
    /// valid until then: the pool will not evict or overwrite the frame
    /// while it is pinned.
    ///
    /// # Errors
    ///
    /// - [`BufferError::PoolExhausted`] if a frame is needed and every frame
    ///   is pinned
    /// - [`BufferError::File`] if reading the page from the file fails
    pub fn read_page(
        &mut self,
        file: &FileRef,
        page_no: PageNo,
    ) -> Result<&mut Page, BufferError> {
        if let Some(frame_no) = self.table.lookup(file.id(), page_no) {
            let frame = &mut self.frames[frame_no];
            frame.set_refbit(true);
            frame.pin();
            trace!("page {} of {} hit in frame {}", page_no, file.name(), frame_no);
            return Ok(&mut self.pages[frame_no]);
        }

        let frame_no = self.alloc_buf()?;
        let page = file.read_page(page_no)?;
        debug!(
            "loaded page {} of {} into frame {}",
            page_no,
            file.name(),
            frame_no
        );
        self.pages[frame_no] = page;
        self.table.insert(file.id(), page_no, frame_no);
        self.frames[frame_no].set(Rc::clone(file), page_no);
        Ok(&mut self.pages[frame_no])
    }

    /// Returns one pin on the page's frame, marking the frame dirty if the
    /// caller modified the page.
    ///
    /// If the page is not resident this is a silent no-op: the page may
    /// simply have been evicted already, and the contract is "if it's here,
    /// drop a reference". The dirty flag is sticky; passing `dirty = false`
    /// never cleans a frame.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::PageNotPinned`] if the frame has no outstanding
    /// pins.
    pub fn unpin_page(
        &mut self,
        file: &FileRef,
        page_no: PageNo,
        dirty: bool,
    ) -> Result<(), BufferError> {
        let Some(frame_no) = self.table.lookup(file.id(), page_no) else {
            return Ok(());
        };

        let frame = &mut self.frames[frame_no];
        if frame.pin_count() == 0 {
            return Err(BufferError::PageNotPinned {
                file: file.name().to_string(),
                page_no,
                frame_no,
            });
        }
        frame.unpin();
        if dirty {
            frame.mark_dirty();
        }
        Ok(())
    }

    /// Allocates a fresh page in the file and returns its number together
    /// with a pinned reference to its (zeroed) frame.
    ///
    /// The frame starts clean; the caller writes into it and unpins with
    /// `dirty = true`.
    ///
    /// # Errors
    ///
    /// - [`BufferError::File`] if the file cannot allocate a page
    /// - [`BufferError::PoolExhausted`] if every frame is pinned
    pub fn alloc_page(&mut self, file: &FileRef) -> Result<(PageNo, &mut Page), BufferError> {
        let page = file.allocate_page()?;
        let page_no = page.page_no();
        let frame_no = self.alloc_buf()?;
        debug!(
            "allocated page {} of {} in frame {}",
            page_no,
            file.name(),
            frame_no
        );
        self.pages[frame_no] = page;
        self.table.insert(file.id(), page_no, frame_no);
        self.frames[frame_no].set(Rc::clone(file), page_no);
        Ok((page_no, &mut self.pages[frame_no]))
    }

    /// Writes back every dirty frame of the file and evicts all of the
    /// file's frames from the pool.
    ///
    /// Frames are visited in ascending index order. On failure, frames
    /// processed before the offending one stay flushed and evicted; there is
    /// no rollback. After a successful flush no frame references the file.
    ///
    /// # Errors
    ///
    /// - [`BufferError::PagePinned`] if a frame of the file still has pins
    /// - [`BufferError::BadBuffer`] if the page table and frame table
    ///   disagree
    /// - [`BufferError::File`] if a write-back fails
    pub fn flush_file(&mut self, file: &FileRef) -> Result<(), BufferError> {
        debug!("flushing {}", file.name());
        for frame_no in 0..self.frames.len() {
            let (owner, page_no) = match self.frames[frame_no].binding() {
                Some((owner, page_no)) if owner.id() == file.id() => {
                    (Rc::clone(owner), page_no)
                }
                _ => continue,
            };

            if self.frames[frame_no].pin_count() > 0 {
                return Err(BufferError::PagePinned {
                    file: owner.name().to_string(),
                    page_no,
                    frame_no,
                });
            }
            if self.frames[frame_no].is_dirty() {
                debug!(
                    "writing back page {} of {} from frame {}",
                    page_no,
                    owner.name(),
                    frame_no
                );
                owner.write_page(&self.pages[frame_no])?;
                self.frames[frame_no].clear_dirty();
            }
            if self.table.remove(owner.id(), page_no).is_none() {
                return Err(self.bad_buffer(frame_no));
            }
            self.frames[frame_no].clear();
        }
        Ok(())
    }

    /// Deletes the page from its file, discarding any cached copy.
    ///
    /// A cached copy is dropped without write-back regardless of its dirty
    /// flag, since the page is going away. If the page is not resident, only
    /// the file-level delete happens.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::File`] if the file-level delete fails.
    pub fn dispose_page(&mut self, file: &FileRef, page_no: PageNo) -> Result<(), BufferError> {
        if let Some(frame_no) = self.table.remove(file.id(), page_no) {
            trace!(
                "discarding page {} of {} from frame {}",
                page_no,
                file.name(),
                frame_no
            );
            self.frames[frame_no].clear();
        }
        file.delete_page(page_no)?;
        Ok(())
    }

    /// Number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    /// Number of pages currently resident.
    pub fn cached_pages(&self) -> usize {
        self.table.len()
    }

    /// Pin count of the page's frame, or `None` if the page is not resident.
    pub fn pin_count(&self, file: &FileRef, page_no: PageNo) -> Option<u32> {
        self.table
            .lookup(file.id(), page_no)
            .map(|frame_no| self.frames[frame_no].pin_count())
    }

    /// Prints a per-frame summary of the pool to stdout.
    pub fn print_self(&self) {
        println!("{}", self);
    }

    /// Finds a frame for the caller to bind, evicting a resident page if
    /// necessary.
    ///
    /// The returned frame is free: the victim's dirty contents have been
    /// written back, its page-table entry removed, and its descriptor
    /// cleared. If the victim's write-back fails the error propagates and
    /// the victim keeps its binding and dirty flag.
    fn alloc_buf(&mut self) -> Result<FrameId, BufferError> {
        let frame_no = self.clock.select(&mut self.frames)?;

        let (file, page_no) = match self.frames[frame_no].binding() {
            Some((file, page_no)) => (Rc::clone(file), page_no),
            None => return Ok(frame_no),
        };

        if self.frames[frame_no].is_dirty() {
            debug!(
                "writing back page {} of {} from frame {}",
                page_no,
                file.name(),
                frame_no
            );
            file.write_page(&self.pages[frame_no])?;
        }
        if self.table.remove(file.id(), page_no).is_none() {
            return Err(self.bad_buffer(frame_no));
        }
        trace!(
            "evicted page {} of {} from frame {}",
            page_no,
            file.name(),
            frame_no
        );
        self.frames[frame_no].clear();
        Ok(frame_no)
    }

    fn bad_buffer(&self, frame_no: FrameId) -> BufferError {
        let frame = &self.frames[frame_no];
        BufferError::BadBuffer {
            frame_no,
            valid: frame.is_valid(),
            dirty: frame.is_dirty(),
            refbit: frame.refbit(),
        }
    }
}

impl fmt::Display for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut valid_frames = 0;
        for frame in &self.frames {
            writeln!(f, "{}", frame)?;
            if frame.is_valid() {
                valid_frames += 1;
            }
        }
        write!(f, "total valid frames: {}", valid_frames)
    }
}
