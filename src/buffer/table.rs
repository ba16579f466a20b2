//! Page table: maps resident pages to their frames.

use std::collections::HashMap;

use super::frame::FrameId;
use crate::file::FileId;
use crate::page::PageNo;

/// Associative index from `(file, page)` to the frame holding that page.
///
/// A lookup miss is an ordinary outcome (`None`), not an error; it is how the
/// pool distinguishes the hit and miss paths. Keys are unique: a page is
/// resident in at most one frame.
pub(crate) struct PageTable {
    map: HashMap<(FileId, PageNo), FrameId>,
}

impl PageTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the frame holding the page, if it is resident.
    pub(crate) fn lookup(&self, file: FileId, page_no: PageNo) -> Option<FrameId> {
        self.map.get(&(file, page_no)).copied()
    }

    /// Records that the page is resident in `frame_no`. The key must be
    /// absent.
    pub(crate) fn insert(&mut self, file: FileId, page_no: PageNo, frame_no: FrameId) {
        let prev = self.map.insert((file, page_no), frame_no);
        debug_assert!(prev.is_none(), "page inserted twice into the page table");
    }

    /// Removes the page's entry, returning the frame it mapped to.
    pub(crate) fn remove(&mut self, file: FileId, page_no: PageNo) -> Option<FrameId> {
        self.map.remove(&(file, page_no))
    }

    /// Number of resident pages.
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
