//! Randomized workload test for the buffer pool.
//!
//! Drives a long seeded sequence of reads, writes, allocations, disposals,
//! and flushes against a pool much smaller than the working set, so pages
//! cycle through eviction constantly. Every write is mirrored into a shadow
//! model; reads are verified against it on the spot, and the final file
//! contents are verified after a flush.

use std::collections::HashMap;
use std::rc::Rc;

use basalt::{BufferPool, DbFile, DiskFile, FileRef, PageNo, PAGE_SIZE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

#[derive(Debug, Clone)]
struct StressConfig {
    /// Number of frames in the pool; kept well below `initial_pages`.
    pool_size: u32,
    /// Pages allocated before the workload starts.
    initial_pages: u32,
    /// Number of random operations to perform.
    ops: usize,
    /// Deterministic seed.
    seed: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            initial_pages: 48,
            ops: 4000,
            seed: 0xBA5A17,
        }
    }
}

/// Expected contents of every live page.
struct ShadowModel {
    pages: HashMap<PageNo, Vec<u8>>,
}

impl ShadowModel {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    fn add_page(&mut self, page_no: PageNo) {
        self.pages.insert(page_no, vec![0u8; PAGE_SIZE]);
    }

    fn remove_page(&mut self, page_no: PageNo) {
        self.pages.remove(&page_no);
    }

    fn apply_write(&mut self, page_no: PageNo, offset: usize, len: usize, add: u8) {
        let shadow = self.pages.get_mut(&page_no).expect("write to dead page");
        for byte in &mut shadow[offset..offset + len] {
            *byte = byte.wrapping_add(add);
        }
    }

    fn live_pages(&self) -> Vec<PageNo> {
        let mut pages: Vec<_> = self.pages.keys().copied().collect();
        pages.sort_unstable();
        pages
    }
}

#[test]
fn test_random_workload_against_shadow_model() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = StressConfig::default();
    let dir = tempdir().unwrap();
    let file: FileRef = Rc::new(DiskFile::open(dir.path().join("stress.db")).unwrap());
    let mut pool = BufferPool::new(config.pool_size);
    let mut shadow = ShadowModel::new();
    let mut rng = StdRng::seed_from_u64(config.seed);

    for _ in 0..config.initial_pages {
        let page = file.allocate_page().unwrap();
        shadow.add_page(page.page_no());
    }

    for op in 0..config.ops {
        let live = shadow.live_pages();
        match rng.gen_range(0..100) {
            // Read a random page and verify a random slice against the model.
            0..=49 => {
                let page_no = live[rng.gen_range(0..live.len())];
                let offset = rng.gen_range(0..PAGE_SIZE);
                let len = rng.gen_range(1..=PAGE_SIZE - offset);

                let page = pool.read_page(&file, page_no).unwrap();
                let expected = &shadow.pages[&page_no][offset..offset + len];
                assert_eq!(
                    &page.as_slice()[offset..offset + len],
                    expected,
                    "stale read of page {} at op {}",
                    page_no,
                    op
                );
                pool.unpin_page(&file, page_no, false).unwrap();
            }
            // Additive write to a random slice, mirrored into the model.
            50..=84 => {
                let page_no = live[rng.gen_range(0..live.len())];
                let offset = rng.gen_range(0..PAGE_SIZE);
                let len = rng.gen_range(1..=PAGE_SIZE - offset);
                let add: u8 = rng.gen_range(1..=u8::MAX);

                let page = pool.read_page(&file, page_no).unwrap();
                for byte in &mut page.as_mut_slice()[offset..offset + len] {
                    *byte = byte.wrapping_add(add);
                }
                pool.unpin_page(&file, page_no, true).unwrap();
                shadow.apply_write(page_no, offset, len, add);
            }
            // Allocate a fresh page through the pool.
            85..=91 => {
                let (page_no, page) = pool.alloc_page(&file).unwrap();
                assert!(page.as_slice().iter().all(|&b| b == 0));
                pool.unpin_page(&file, page_no, false).unwrap();
                shadow.add_page(page_no);
            }
            // Dispose a random page.
            92..=95 => {
                if live.len() > 1 {
                    let page_no = live[rng.gen_range(0..live.len())];
                    pool.dispose_page(&file, page_no).unwrap();
                    shadow.remove_page(page_no);
                }
            }
            // Flush everything out of the pool.
            _ => {
                pool.flush_file(&file).unwrap();
                assert_eq!(pool.cached_pages(), 0);
            }
        }
    }

    // Push the survivors to disk and verify the file byte-for-byte.
    pool.flush_file(&file).unwrap();
    for page_no in shadow.live_pages() {
        let on_disk = file.read_page(page_no).unwrap();
        assert_eq!(
            on_disk.as_slice(),
            shadow.pages[&page_no].as_slice(),
            "page {} diverged from the shadow model",
            page_no
        );
    }
}
