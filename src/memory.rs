use crate::constants::*;

/// One physical frame. The owner is a process id, never a handle to the
/// process itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    owner: Option<Pid>,
    page: Page,
    load_time: Tick,
}

impl Frame {
    /// Create a free frame
    pub fn new() -> Self {
        Frame { owner: None, page: 0, load_time: 0 }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// Place `page` of `owner` in this frame, overwriting whatever was there.
    pub fn fill(&mut self, owner: Pid, page: Page, load_time: Tick) {
        self.owner = Some(owner);
        self.page = page;
        self.load_time = load_time;
    }

    /// Overwrite this frame with a matured pending load, keeping its fault tick.
    pub fn copy_from(&mut self, pending: &PendingLoad) {
        self.fill(pending.owner, pending.page, pending.fault_time);
    }

    /// Return the frame to the free state.
    pub fn clear(&mut self) {
        *self = Frame::new();
    }

    /// Does this frame hold `page` for `owner`?
    #[inline]
    pub fn holds(&self, owner: Pid, page: Page) -> bool {
        self.owner == Some(owner) && self.page == page
    }

    #[inline]
    pub fn owner(&self) -> Option<Pid> {
        self.owner
    }

    /// Resident page, if the frame is occupied
    pub fn page(&self) -> Option<Page> {
        self.owner.map(|_| self.page)
    }

    pub fn load_time(&self) -> Tick {
        self.load_time
    }

    /// Owner and page, if occupied.
    pub fn contents(&self) -> Option<(Pid, Page)> {
        self.owner.map(|pid| (pid, self.page))
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// A page fault in flight: the page becomes loadable
/// `PAGE_LOAD_LATENCY` ticks after `fault_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLoad {
    pub owner: Pid,
    pub page: Page,
    pub fault_time: Tick,
}

impl PendingLoad {
    pub fn new(owner: Pid, page: Page, fault_time: Tick) -> Self {
        PendingLoad { owner, page, fault_time }
    }

    #[inline]
    pub fn ready_at(&self) -> Tick {
        self.fault_time + PAGE_LOAD_LATENCY
    }

    #[inline]
    pub fn is_ready(&self, now: Tick) -> bool {
        self.ready_at() <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_starts_free() {
        let frame = Frame::new();
        assert!(frame.is_free());
        assert_eq!(frame.owner(), None);
        assert_eq!(frame.page(), None);
        assert!(!frame.holds(1, 0));
    }

    #[test]
    fn test_frame_fill_and_clear() {
        let mut frame = Frame::new();
        frame.fill(2, 7, 13);

        assert!(!frame.is_free());
        assert!(frame.holds(2, 7));
        assert!(!frame.holds(1, 7)); // same page, other process
        assert!(!frame.holds(2, 8));
        assert_eq!(frame.load_time(), 13);
        assert_eq!(frame.contents(), Some((2, 7)));

        frame.clear();
        assert!(frame.is_free());
        assert_eq!(frame.contents(), None);
    }

    #[test]
    fn test_frame_overwrite() {
        let mut frame = Frame::new();
        frame.fill(1, 1, 4);
        frame.fill(1, 4, 19);
        assert!(frame.holds(1, 4));
        assert!(!frame.holds(1, 1));
        assert_eq!(frame.load_time(), 19);
    }

    #[test]
    fn test_copy_from_pending_keeps_fault_tick() {
        let mut frame = Frame::new();
        frame.copy_from(&PendingLoad::new(3, 9, 10));
        assert!(frame.holds(3, 9));
        assert_eq!(frame.load_time(), 10);
    }

    #[test]
    fn test_pending_load_latency() {
        let pending = PendingLoad::new(1, 5, 10);
        assert_eq!(pending.ready_at(), 14);
        assert!(!pending.is_ready(13));
        assert!(pending.is_ready(14));
        assert!(pending.is_ready(20));
    }
}
