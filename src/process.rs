use crate::constants::*;
use crate::error::SimError;

/// The immutable part of a process: what the input files describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescriptor {
    pub id: Pid,
    pub name: String,
    pub pages: Vec<Page>,
}

impl ProcessDescriptor {
    /// Build a descriptor, rejecting page sequences above the per-process limit.
    pub fn new(id: Pid, name: impl Into<String>, pages: Vec<Page>) -> Result<Self, SimError> {
        let name = name.into();
        if pages.len() > MAX_PAGES_PER_PROCESS {
            return Err(SimError::TooManyPages { name, count: pages.len() });
        }
        Ok(ProcessDescriptor { id, name, pages })
    }
}

/// Per-run simulation state for one process.
#[derive(Debug, Clone)]
pub struct Process {
    id: Pid,
    name: String,
    pages: Vec<Page>,

    cursor: usize,
    fault_times: Vec<Tick>,
    blocked_until: Option<Tick>,
    finish_time: Option<Tick>,
    is_blocked: bool,
    /// First frame of this process's segment under fixed-local. The
    /// policy owns the segment map; this copy is informational and feeds
    /// logs and reports.
    partition_offset: Option<usize>,
}

impl Process {
    pub fn from_descriptor(desc: &ProcessDescriptor) -> Self {
        let mut process = Process {
            id: desc.id,
            name: desc.name.clone(),
            pages: desc.pages.clone(),
            cursor: 0,
            fault_times: Vec::new(),
            blocked_until: None,
            finish_time: None,
            is_blocked: false,
            partition_offset: None,
        };
        process.settle_if_empty();
        process
    }

    /// Restore the initial simulation state, keeping identity and pages.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.fault_times.clear();
        self.blocked_until = None;
        self.finish_time = None;
        self.is_blocked = false;
        self.settle_if_empty();
    }

    // an empty sequence is exhausted from the start
    fn settle_if_empty(&mut self) {
        if self.pages.is_empty() {
            self.finish_time = Some(ARRIVAL_TIME);
        }
    }

    #[inline]
    pub fn id(&self) -> Pid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The page the process will touch next, or `None` once exhausted.
    #[inline]
    pub fn next_page(&self) -> Option<Page> {
        self.pages.get(self.cursor).copied()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Mark the current page as executed.
    pub fn advance(&mut self) {
        debug_assert!(self.cursor < self.pages.len());
        self.cursor += 1;
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.pages.len()
    }

    pub fn record_fault(&mut self, now: Tick) {
        self.fault_times.push(now);
    }

    pub fn fault_times(&self) -> &[Tick] {
        &self.fault_times
    }

    pub fn block_until(&mut self, tick: Tick) {
        self.blocked_until = Some(tick);
        self.is_blocked = true;
    }

    pub fn unblock(&mut self) {
        self.is_blocked = false;
    }

    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    pub fn blocked_until(&self) -> Option<Tick> {
        self.blocked_until
    }

    /// Set once, when the last page access completes.
    pub fn finish(&mut self, now: Tick) {
        debug_assert!(self.is_finished());
        debug_assert!(self.finish_time.is_none());
        self.finish_time = Some(now);
    }

    pub fn finish_time(&self) -> Option<Tick> {
        self.finish_time
    }

    pub fn turnaround_time(&self) -> Option<Tick> {
        self.finish_time.map(|t| t - ARRIVAL_TIME)
    }

    pub fn set_partition_offset(&mut self, offset: usize) {
        self.partition_offset = Some(offset);
    }

    pub fn partition_offset(&self) -> Option<usize> {
        self.partition_offset
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Process(id={}, name={}, pages={})", self.id, self.name, self.pages.len())
    }
}
