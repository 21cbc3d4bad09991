//! Frame allocation and replacement policies.
//!
//! The scheduler only ever talks to memory through [`ReplacementPolicy`]:
//! a residency test, a load of a matured fault, and a release when a
//! process finishes. Both policies replace in FIFO order; they differ in
//! which frames a process may use.

mod global;
mod local;

pub use global::GlobalFifo;
pub use local::FixedLocal;

use std::ops::Range;

use crate::constants::*;
use crate::memory::{Frame, PendingLoad};

/// Where a matured page ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Index of the frame that now holds the page
    pub frame: usize,
    /// Previous occupant, when a page had to be evicted
    pub evicted: Option<(Pid, Page)>,
}

pub trait ReplacementPolicy {
    /// Display name used in reports
    fn name(&self) -> &'static str;

    /// Is `page` of process `pid` resident?
    fn is_resident(&self, pid: Pid, page: Page) -> bool;

    /// Place a matured page, taking a free frame or evicting the oldest
    /// eligible one.
    fn load(&mut self, pending: &PendingLoad, now: Tick) -> LoadOutcome;

    /// Free every frame owned by `pid`. Returns how many were released.
    fn release(&mut self, pid: Pid) -> usize;

    /// Frames in index order.
    fn frames(&self) -> Vec<Frame>;

    /// The frame range reserved for `pid`, if the policy partitions memory.
    fn partition(&self, _pid: Pid) -> Option<Range<usize>> {
        None
    }
}
