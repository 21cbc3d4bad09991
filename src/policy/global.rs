use std::collections::VecDeque;

use log::trace;

use super::{LoadOutcome, ReplacementPolicy};
use crate::constants::*;
use crate::memory::{Frame, PendingLoad};

/// Variable allocation, global replacement.
///
/// All frames form one pool kept in a FIFO of slot indices. A free slot
/// anywhere in the pool is taken first, in FIFO order; otherwise the head
/// slot is overwritten and moved to the tail.
#[derive(Debug, Clone)]
pub struct GlobalFifo {
    frames: Vec<Frame>,
    order: VecDeque<usize>,
}

impl GlobalFifo {
    pub fn new(num_frames: usize) -> Self {
        GlobalFifo {
            frames: vec![Frame::new(); num_frames],
            order: (0..num_frames).collect(),
        }
    }

    /// Slot indices from oldest to newest.
    pub fn eviction_order(&self) -> Vec<usize> {
        self.order.iter().copied().collect()
    }
}

impl ReplacementPolicy for GlobalFifo {
    fn name(&self) -> &'static str {
        "Variable-Global Replacement"
    }

    fn is_resident(&self, pid: Pid, page: Page) -> bool {
        self.frames.iter().any(|f| f.holds(pid, page))
    }

    fn load(&mut self, pending: &PendingLoad, _now: Tick) -> LoadOutcome {
        if let Some(&index) = self.order.iter().find(|&&i| self.frames[i].is_free()) {
            self.frames[index].copy_from(pending);
            trace!("global: P{} page {} -> frame {} (free)", pending.owner, pending.page, index);
            return LoadOutcome { frame: index, evicted: None };
        }

        // `validate` rejects F < N with N >= 1, so the pool always has a slot
        let Some(victim) = self.order.pop_front() else {
            unreachable!("global pool built with zero frames");
        };
        let evicted = self.frames[victim].contents();
        self.frames[victim].copy_from(pending);
        self.order.push_back(victim);
        trace!(
            "global: P{} page {} -> frame {} (evicted {:?})",
            pending.owner, pending.page, victim, evicted
        );
        LoadOutcome { frame: victim, evicted }
    }

    fn release(&mut self, pid: Pid) -> usize {
        let mut released = 0;
        for frame in self.frames.iter_mut().filter(|f| f.owner() == Some(pid)) {
            frame.clear();
            released += 1;
        }
        trace!("global: released {} frames of P{}", released, pid);
        released
    }

    fn frames(&self) -> Vec<Frame> {
        self.frames.clone()
    }
}
