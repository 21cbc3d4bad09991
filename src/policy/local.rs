use std::collections::HashMap;
use std::ops::Range;

use log::trace;

use super::{LoadOutcome, ReplacementPolicy};
use crate::constants::*;
use crate::memory::{Frame, PendingLoad};

/// Fixed allocation, local replacement.
///
/// Memory is cut into `frames / processes` sized segments handed out in
/// process order. A process only ever searches, fills and evicts inside
/// its own segment. Leftover frames past the last segment stay unused,
/// and a segment freed by a finished process is never given to anyone else.
#[derive(Debug, Clone)]
pub struct FixedLocal {
    frames: Vec<Frame>,
    frames_per_process: usize,
    offsets: HashMap<Pid, usize>,
}

impl FixedLocal {
    /// `pids` fixes segment assignment order. Callers must have checked
    /// that there is at least one frame per process.
    pub fn new(num_frames: usize, pids: &[Pid]) -> Self {
        let frames_per_process = if pids.is_empty() { 0 } else { num_frames / pids.len() };
        let offsets = pids
            .iter()
            .enumerate()
            .map(|(i, &pid)| (pid, i * frames_per_process))
            .collect();

        FixedLocal {
            frames: vec![Frame::new(); num_frames],
            frames_per_process,
            offsets,
        }
    }

    pub fn frames_per_process(&self) -> usize {
        self.frames_per_process
    }

    fn segment(&self, pid: Pid) -> Range<usize> {
        match self.offsets.get(&pid) {
            Some(&start) => start..start + self.frames_per_process,
            None => 0..0,
        }
    }
}

impl ReplacementPolicy for FixedLocal {
    fn name(&self) -> &'static str {
        "Fixed-Local Replacement"
    }

    fn is_resident(&self, pid: Pid, page: Page) -> bool {
        self.frames[self.segment(pid)].iter().any(|f| f.holds(pid, page))
    }

    fn load(&mut self, pending: &PendingLoad, now: Tick) -> LoadOutcome {
        // Every pid the scheduler loads for was passed to `new`, and
        // `validate` guarantees at least one frame per process, so the
        // segment is never empty.
        let segment = self.segment(pending.owner);
        if segment.is_empty() {
            unreachable!("P{} has no frame segment; was it passed to FixedLocal::new?", pending.owner);
        }

        if let Some(index) = segment.clone().find(|&i| self.frames[i].is_free()) {
            self.frames[index].fill(pending.owner, pending.page, now);
            trace!("local: P{} page {} -> frame {} (free)", pending.owner, pending.page, index);
            return LoadOutcome { frame: index, evicted: None };
        }

        // oldest load time wins, lowest index on ties
        let mut victim = segment.start;
        for i in segment.start + 1..segment.end {
            if self.frames[i].load_time() < self.frames[victim].load_time() {
                victim = i;
            }
        }

        let evicted = self.frames[victim].contents();
        self.frames[victim].fill(pending.owner, pending.page, now);
        trace!(
            "local: P{} page {} -> frame {} (evicted {:?})",
            pending.owner, pending.page, victim, evicted
        );
        LoadOutcome { frame: victim, evicted }
    }

    fn release(&mut self, pid: Pid) -> usize {
        let segment = self.segment(pid);
        let released = self.frames[segment.clone()].iter().filter(|f| !f.is_free()).count();
        for frame in &mut self.frames[segment] {
            frame.clear();
        }
        trace!("local: released {} frames of P{}", released, pid);
        released
    }

    fn frames(&self) -> Vec<Frame> {
        self.frames.clone()
    }

    fn partition(&self, pid: Pid) -> Option<Range<usize>> {
        self.offsets.get(&pid).map(|_| self.segment(pid))
    }
}
