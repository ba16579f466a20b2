//! Frame descriptors for the buffer pool.
//!
//! A frame is a slot in the pool that can hold one page at a time. The
//! descriptor tracks which `(file, page)` the frame is bound to and the state
//! the replacement engine and pinning discipline operate on.

use std::fmt;

use crate::file::{DbFile, FileRef};
use crate::page::PageNo;

/// Index of a frame in the buffer pool.
///
/// `FrameId` is distinct from [`PageNo`](crate::page::PageNo): a page number
/// identifies a logical page on disk, a frame id identifies a physical memory
/// slot. Frame ids are valid only within one pool and range from 0 to
/// `num_bufs - 1`.
pub type FrameId = usize;

/// Per-frame metadata.
///
/// # Lifecycle
///
/// 1. **Free**: `binding` is `None`; all flags clear, pin count zero
/// 2. **Bound**: [`set`](FrameDesc::set) binds a `(file, page)` and pins once
/// 3. **Pinned**: `pin_count > 0`, the frame cannot be evicted
/// 4. **Unpinned**: `pin_count == 0`, the clock may evict it
/// 5. **Cleared**: [`clear`](FrameDesc::clear) returns the frame to free
pub(crate) struct FrameDesc {
    frame_no: FrameId,
    /// The `(file, page)` currently held, if any. A frame is *valid* exactly
    /// when it holds a binding.
    binding: Option<(FileRef, PageNo)>,
    /// Number of outstanding references. A frame cannot be evicted while
    /// `pin_count > 0`.
    pin_count: u32,
    /// Whether the page has been modified since it was loaded. A dirty frame
    /// must be written back before its binding is destroyed by eviction or
    /// flush.
    dirty: bool,
    /// Clock reference bit: set on every cache hit, cleared by the sweep.
    /// Grants one round of grace before eviction.
    refbit: bool,
}

impl FrameDesc {
    /// Creates a free descriptor for the frame at the given index.
    pub(crate) fn new(frame_no: FrameId) -> Self {
        Self {
            frame_no,
            binding: None,
            pin_count: 0,
            dirty: false,
            refbit: false,
        }
    }

    pub(crate) fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    /// Returns true if the frame holds a page.
    pub(crate) fn is_valid(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns the bound `(file, page)`, if any.
    pub(crate) fn binding(&self) -> Option<(&FileRef, PageNo)> {
        self.binding.as_ref().map(|(file, page_no)| (file, *page_no))
    }

    pub(crate) fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn refbit(&self) -> bool {
        self.refbit
    }

    pub(crate) fn set_refbit(&mut self, on: bool) {
        self.refbit = on;
    }

    /// Increments the pin count.
    pub(crate) fn pin(&mut self) {
        self.pin_count = self.pin_count.checked_add(1).expect("pin_count overflow");
    }

    /// Decrements the pin count. The caller checks `pin_count > 0` first.
    pub(crate) fn unpin(&mut self) {
        debug_assert!(self.pin_count > 0, "unpin on a frame with no pins");
        self.pin_count -= 1;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag after a successful write-back.
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Binds the frame to `(file, page_no)`.
    ///
    /// Leaves the frame pinned exactly once, clean, with the reference bit
    /// clear.
    pub(crate) fn set(&mut self, file: FileRef, page_no: PageNo) {
        self.binding = Some((file, page_no));
        self.pin_count = 1;
        self.dirty = false;
        self.refbit = false;
    }

    /// Returns the frame to the free state, forgetting its binding.
    pub(crate) fn clear(&mut self) {
        self.binding = None;
        self.pin_count = 0;
        self.dirty = false;
        self.refbit = false;
    }
}

impl fmt::Display for FrameDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some((file, page_no)) => write!(
                f,
                "frame {}: page {} of {}, pin_count={}, dirty={}, refbit={}",
                self.frame_no,
                page_no,
                file.name(),
                self.pin_count,
                self.dirty,
                self.refbit
            ),
            None => write!(f, "frame {}: free", self.frame_no),
        }
    }
}
