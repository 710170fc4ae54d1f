use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_BREAKPOINT_ID: AtomicU64 = AtomicU64::new(1);

/// A breakpoint set by the user on a 0-based document line.
///
/// Two breakpoints on the same line are distinct unless they share an id, so result
/// maps can be keyed by breakpoint without collapsing duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: u64,
    pub line: u32,
}

impl Breakpoint {
    /// Creates a breakpoint with a fresh process-wide id.
    pub fn new(line: u32) -> Self {
        Breakpoint { id: NEXT_BREAKPOINT_ID.fetch_add(1, Ordering::Relaxed), line }
    }

    /// Creates a breakpoint with an id assigned by the client.
    pub fn with_id(id: u64, line: u32) -> Self {
        Breakpoint { id, line }
    }
}
