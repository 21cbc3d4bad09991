// time unit aliases (ticks are never negative, pages/pids come from input files)
pub type Tick = u64;
pub type Pid = u32;
pub type Page = u32;

// a faulted page becomes resident this many ticks after the fault
pub const PAGE_LOAD_LATENCY: Tick = 4;

pub const MAX_PAGES_PER_PROCESS: usize = 50;

// ids are handed out in input order starting here
pub const FIRST_PROCESS_ID: Pid = 1;

pub const ARRIVAL_TIME: Tick = 0;

pub const REPORT_SEPARATOR_WIDTH: usize = 60;
