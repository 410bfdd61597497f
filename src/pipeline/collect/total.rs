use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The pipeline-wide count of images ever submitted, announced once by the
/// upstream control path and read by every stage instance's completion check.
///
/// Reads vastly outnumber the single write, so this is a shared atomic rather
/// than anything locked. Zero means "not announced yet"; a second store is
/// last-write-wins per the single-producer convention.
#[derive(Debug, Clone, Default)]
pub struct SharedImageTotal(Arc<AtomicU64>);

impl SharedImageTotal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, total: u64) {
        self.0.store(total, Ordering::Release);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}
