//! Round Robin scheduler driving demand-paged processes tick by tick.
//!
//! One call to [`Scheduler::dispatch`] is one pass of the outer loop:
//!
//! 1. mature pending loads whose latency has elapsed,
//! 2. move unblocked processes from the blocked queue to the ready queue,
//! 3. idle for one tick if nothing is ready, otherwise
//! 4. run the head of the ready queue for up to one quantum.
//!
//! Steps 1 and 2 are repeated after every page the running process
//! executes, so a process unblocking at the tick another process's quantum
//! runs out is queued ahead of it.

use std::collections::{HashSet, VecDeque};

use log::{debug, info};

use crate::constants::*;
use crate::error::SimError;
use crate::memory::PendingLoad;
use crate::policy::{LoadOutcome, ReplacementPolicy};
use crate::process::{Process, ProcessDescriptor};
use crate::report::ProcessReport;

/// Something that happened during a run, stamped with the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Dispatch { time: Tick, pid: Pid },
    Hit { time: Tick, pid: Pid, page: Page },
    Fault { time: Tick, pid: Pid, page: Page },
    Loaded { time: Tick, pid: Pid, page: Page, outcome: LoadOutcome },
    Unblocked { time: Tick, pid: Pid },
    QuantumExpired { time: Tick, pid: Pid },
    Finished { time: Tick, pid: Pid },
    Released { time: Tick, pid: Pid, frames: usize },
    Idle { time: Tick },
}

impl std::fmt::Display for SimEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimEvent::Dispatch { time, pid } => write!(f, "t={:<4} P{} dispatched", time, pid),
            SimEvent::Hit { time, pid, page } => write!(f, "t={:<4} P{} page {} hit", time, pid, page),
            SimEvent::Fault { time, pid, page } => write!(f, "t={:<4} P{} page {} FAULT", time, pid, page),
            SimEvent::Loaded { time, pid, page, outcome } => match outcome.evicted {
                Some((victim, old)) => write!(
                    f,
                    "t={:<4} P{} page {} loaded into frame {} (evicted P{} page {})",
                    time, pid, page, outcome.frame, victim, old
                ),
                None => write!(f, "t={:<4} P{} page {} loaded into frame {}", time, pid, page, outcome.frame),
            },
            SimEvent::Unblocked { time, pid } => write!(f, "t={:<4} P{} unblocked", time, pid),
            SimEvent::QuantumExpired { time, pid } => write!(f, "t={:<4} P{} quantum expired", time, pid),
            SimEvent::Finished { time, pid } => write!(f, "t={:<4} P{} finished", time, pid),
            SimEvent::Released { time, pid, frames } => {
                write!(f, "t={:<4} P{} released {} frames", time, pid, frames)
            }
            SimEvent::Idle { time } => write!(f, "t={:<4} CPU idle", time),
        }
    }
}

pub struct Scheduler<P: ReplacementPolicy> {
    policy: P,
    quantum: u32,
    clock: Tick,
    processes: Vec<Process>,
    // queues hold indices into `processes`
    ready: VecDeque<usize>,
    blocked: VecDeque<usize>,
    pending: VecDeque<PendingLoad>,
    trace: Option<Vec<SimEvent>>,
}

impl<P: ReplacementPolicy> Scheduler<P> {
    /// Build a scheduler over fresh per-run state derived from `descriptors`.
    ///
    /// `make_policy` receives the process ids in input order and must
    /// size its memory for `frames` frames.
    pub fn new<F>(
        descriptors: &[ProcessDescriptor],
        frames: usize,
        quantum: u32,
        make_policy: F,
    ) -> Result<Self, SimError>
    where
        F: FnOnce(usize, &[Pid]) -> P,
    {
        validate(descriptors, frames, quantum)?;

        let pids: Vec<Pid> = descriptors.iter().map(|d| d.id).collect();
        let policy = make_policy(frames, &pids);

        let mut processes: Vec<Process> = descriptors.iter().map(Process::from_descriptor).collect();
        let mut ready = VecDeque::with_capacity(processes.len());
        for (index, process) in processes.iter_mut().enumerate() {
            if let Some(range) = policy.partition(process.id()) {
                process.set_partition_offset(range.start);
            }
            // everything arrives at t=0, in input order
            if !process.is_finished() {
                ready.push_back(index);
            }
        }

        Ok(Scheduler {
            policy,
            quantum,
            clock: ARRIVAL_TIME,
            processes,
            ready,
            blocked: VecDeque::new(),
            pending: VecDeque::new(),
            trace: None,
        })
    }

    /// Record a [`SimEvent`] trace during the run.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline]
    pub fn clock(&self) -> Tick {
        self.clock
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn ready_ids(&self) -> Vec<Pid> {
        self.ready.iter().map(|&i| self.processes[i].id()).collect()
    }

    pub fn blocked_ids(&self) -> Vec<Pid> {
        self.blocked.iter().map(|&i| self.processes[i].id()).collect()
    }

    pub fn pending_loads(&self) -> &VecDeque<PendingLoad> {
        &self.pending
    }

    pub fn events(&self) -> &[SimEvent] {
        self.trace.as_deref().unwrap_or(&[])
    }

    pub fn is_done(&self) -> bool {
        self.ready.is_empty() && self.blocked.is_empty()
    }

    /// Run to completion and return one report per process, in input order.
    pub fn run(&mut self) -> Vec<ProcessReport> {
        info!(
            "{}: {} processes, {} frames, quantum {}",
            self.policy.name(),
            self.processes.len(),
            self.policy.frames().len(),
            self.quantum
        );

        while !self.is_done() {
            self.dispatch();
        }

        info!("{}: all processes finished at t={}", self.policy.name(), self.clock);
        self.reports()
    }

    pub fn reports(&self) -> Vec<ProcessReport> {
        self.processes.iter().map(ProcessReport::from_process).collect()
    }

    /// One pass of the outer scheduling loop. Does nothing once done.
    pub fn dispatch(&mut self) {
        if self.is_done() {
            return;
        }

        self.mature_pending_loads();
        self.unblock_processes();

        let Some(current) = self.ready.pop_front() else {
            // CPU idle, somebody is still blocked
            debug!("t={} idle", self.clock);
            self.record(SimEvent::Idle { time: self.clock });
            self.clock += 1;
            return;
        };

        let pid = self.processes[current].id();
        match self.processes[current].partition_offset() {
            Some(offset) => debug!("t={} dispatch P{} (segment at frame {})", self.clock, pid, offset),
            None => debug!("t={} dispatch P{}", self.clock, pid),
        }
        self.record(SimEvent::Dispatch { time: self.clock, pid });

        let mut remaining = self.quantum;
        while remaining > 0 && !self.processes[current].is_finished() {
            let Some(page) = self.processes[current].next_page() else {
                break;
            };

            if self.policy.is_resident(pid, page) {
                self.processes[current].advance();
                self.record(SimEvent::Hit { time: self.clock, pid, page });
                self.clock += 1;
                remaining -= 1;

                self.mature_pending_loads();
                self.unblock_processes();

                if self.processes[current].is_finished() {
                    self.finish(current);
                }
            } else {
                self.fault(current, page);
                break;
            }
        }

        let process = &self.processes[current];
        if !process.is_finished() && !process.is_blocked() {
            debug!("t={} P{} quantum expired", self.clock, pid);
            self.record(SimEvent::QuantumExpired { time: self.clock, pid });
            self.ready.push_back(current);
        }
    }

    /// Hand every matured pending load to the policy, oldest first.
    fn mature_pending_loads(&mut self) {
        while let Some(pending) = self.pending.front().copied() {
            if !pending.is_ready(self.clock) {
                // fault ticks only grow along the queue
                break;
            }
            self.pending.pop_front();

            let outcome = self.policy.load(&pending, self.clock);
            self.record(SimEvent::Loaded {
                time: self.clock,
                pid: pending.owner,
                page: pending.page,
                outcome,
            });
        }
    }

    fn unblock_processes(&mut self) {
        while let Some(&index) = self.blocked.front() {
            let process = &mut self.processes[index];
            match process.blocked_until() {
                Some(until) if until <= self.clock => {}
                _ => break,
            }
            self.blocked.pop_front();
            process.unblock();

            let pid = process.id();
            debug!("t={} P{} unblocked", self.clock, pid);
            self.record(SimEvent::Unblocked { time: self.clock, pid });
            self.ready.push_back(index);
        }
    }

    /// Page fault: costs no time, forfeits the rest of the quantum.
    fn fault(&mut self, index: usize, page: Page) {
        let now = self.clock;
        let process = &mut self.processes[index];
        let pid = process.id();

        process.record_fault(now);
        process.block_until(now + PAGE_LOAD_LATENCY);
        self.pending.push_back(PendingLoad::new(pid, page, now));
        self.blocked.push_back(index);

        debug!("t={} P{} faulted on page {}", now, pid, page);
        self.record(SimEvent::Fault { time: now, pid, page });
    }

    fn finish(&mut self, index: usize) {
        let now = self.clock;
        let process = &mut self.processes[index];
        let pid = process.id();
        process.finish(now);

        let frames = self.policy.release(pid);
        debug!("t={} P{} finished, {} frames released", now, pid, frames);
        self.record(SimEvent::Finished { time: now, pid });
        self.record(SimEvent::Released { time: now, pid, frames });
    }

    fn record(&mut self, event: SimEvent) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(event);
        }
    }
}

/// Reject configurations no run can start from.
pub fn validate(descriptors: &[ProcessDescriptor], frames: usize, quantum: u32) -> Result<(), SimError> {
    if quantum == 0 {
        return Err(SimError::InvalidQuantum);
    }
    if descriptors.is_empty() {
        return Err(SimError::NoProcesses);
    }
    if frames / descriptors.len() < 1 {
        return Err(SimError::InsufficientFrames { frames, processes: descriptors.len() });
    }

    let mut seen = HashSet::new();
    for desc in descriptors {
        if desc.pages.len() > MAX_PAGES_PER_PROCESS {
            return Err(SimError::TooManyPages { name: desc.name.clone(), count: desc.pages.len() });
        }
        if !seen.insert(desc.id) {
            return Err(SimError::DuplicateProcessId(desc.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FixedLocal, GlobalFifo};

    fn desc(id: Pid, pages: &[Page]) -> ProcessDescriptor {
        ProcessDescriptor::new(id, format!("Process{}", id), pages.to_vec()).unwrap()
    }

    fn global(descs: &[ProcessDescriptor], frames: usize, quantum: u32) -> Scheduler<GlobalFifo> {
        Scheduler::new(descs, frames, quantum, |f, _| GlobalFifo::new(f)).unwrap()
    }

    fn local(descs: &[ProcessDescriptor], frames: usize, quantum: u32) -> Scheduler<FixedLocal> {
        Scheduler::new(descs, frames, quantum, FixedLocal::new).unwrap()
    }

    #[test]
    fn test_single_process_trace() {
        // F=3, Q=2, pages 1 2 3 1 2: three cold faults, then hits
        let descs = vec![desc(1, &[1, 2, 3, 1, 2])];
        let reports = global(&descs, 3, 2).run();

        assert_eq!(reports[0].fault_times, vec![0, 5, 10]);
        assert_eq!(reports[0].fault_count, 3);
        assert_eq!(reports[0].turnaround_time, 17);

        let reports = local(&descs, 3, 2).run();
        assert_eq!(reports[0].fault_times, vec![0, 5, 10]);
        assert_eq!(reports[0].turnaround_time, 17);
    }

    #[test]
    fn test_global_evicts_first_loaded_page() {
        let descs = vec![desc(1, &[1, 2, 3, 4])];
        let mut sched = global(&descs, 3, 2).with_trace();
        let reports = sched.run();

        assert_eq!(reports[0].fault_times, vec![0, 5, 10, 15]);
        assert_eq!(reports[0].turnaround_time, 20);

        let evictions: Vec<_> = sched
            .events()
            .iter()
            .filter_map(|e| match e {
                SimEvent::Loaded { time, page, outcome, .. } => {
                    outcome.evicted.map(|victim| (*time, *page, outcome.frame, victim))
                }
                _ => None,
            })
            .collect();
        assert_eq!(evictions, vec![(19, 4, 0, (1, 1))]);
    }

    #[test]
    fn test_unblocked_process_queued_before_expired_one() {
        // A faults on 6 at t=5 and matures at t=9, the same tick B's
        // quantum (4) runs out
        let descs = vec![desc(1, &[5, 6, 7]), desc(2, &[1, 1, 1, 1, 1, 1, 1, 1])];
        let mut sched = global(&descs, 4, 4);

        while sched.clock() < 9 {
            sched.dispatch();
        }
        assert_eq!(sched.clock(), 9);
        assert_eq!(sched.ready_ids(), vec![1, 2]);
        assert!(sched.blocked_ids().is_empty());

        let reports = sched.run();
        assert_eq!(reports[0].fault_times, vec![0, 5, 10]);
        assert_eq!(reports[0].turnaround_time, 15);
        assert_eq!(reports[1].fault_times, vec![0]);
        assert_eq!(reports[1].turnaround_time, 14);
    }

    #[test]
    fn test_same_ordering_under_local() {
        let descs = vec![desc(1, &[5, 6, 7]), desc(2, &[1, 1, 1, 1, 1, 1, 1, 1])];
        let mut sched = local(&descs, 4, 4);

        while sched.clock() < 9 {
            sched.dispatch();
        }
        assert_eq!(sched.ready_ids(), vec![1, 2]);

        let reports = sched.run();
        assert_eq!(reports[0].turnaround_time, 15);
        assert_eq!(reports[1].turnaround_time, 14);
    }

    #[test]
    fn test_fault_forfeits_quantum() {
        let descs = vec![desc(1, &[1]), desc(2, &[2])];
        let mut sched = global(&descs, 2, 3);

        sched.dispatch();
        assert_eq!(sched.clock(), 0);
        assert_eq!(sched.ready_ids(), vec![2]);
        assert_eq!(sched.blocked_ids(), vec![1]);
        assert_eq!(sched.pending_loads().len(), 1);

        sched.dispatch();
        assert_eq!(sched.blocked_ids(), vec![1, 2]);
        assert!(sched.ready_ids().is_empty());
    }

    #[test]
    fn test_idle_cpu_advances_clock() {
        let descs = vec![desc(1, &[1])];
        let mut sched = global(&descs, 1, 1).with_trace();
        sched.dispatch(); // fault at 0
        for expected in 1..=4 {
            sched.dispatch();
            assert_eq!(sched.clock(), expected);
        }
        assert_eq!(
            sched.events().iter().filter(|e| matches!(e, SimEvent::Idle { .. })).count(),
            4
        );

        sched.run();
        assert_eq!(sched.processes()[0].finish_time(), Some(5));
    }

    #[test]
    fn test_local_and_global_diverge() {
        // B finishes early; global lets A reuse B's frame, local does not
        let descs = vec![desc(1, &[1, 2, 3, 1]), desc(2, &[9])];

        let reports = local(&descs, 4, 2).run();
        assert_eq!(reports[0].fault_times, vec![0, 5, 10, 15]);
        assert_eq!(reports[0].turnaround_time, 20);
        assert_eq!(reports[1].fault_times, vec![0]);
        assert_eq!(reports[1].turnaround_time, 6);

        let reports = global(&descs, 4, 2).run();
        assert_eq!(reports[0].fault_times, vec![0, 5, 10]);
        assert_eq!(reports[0].turnaround_time, 16);
        assert_eq!(reports[1].turnaround_time, 6);
    }

    #[test]
    fn test_local_partitions_are_isolated() {
        let descs = vec![desc(1, &[1, 2, 3, 1, 2, 3, 4]), desc(2, &[1, 2, 3, 4, 1, 2])];
        let mut sched = local(&descs, 4, 3).with_trace();
        sched.run();

        let policy = sched.policy();
        let mut loads = 0;
        for event in sched.events() {
            if let SimEvent::Loaded { pid, outcome, .. } = event {
                loads += 1;
                let segment = policy.partition(*pid).unwrap();
                assert!(segment.contains(&outcome.frame), "P{} loaded outside its segment", pid);
                if let Some((victim, _)) = outcome.evicted {
                    assert_eq!(victim, *pid);
                }
            }
        }
        assert!(loads > 0);
        assert_eq!(sched.processes()[0].partition_offset(), Some(0));
        assert_eq!(sched.processes()[1].partition_offset(), Some(2));
    }

    #[test]
    fn test_reports_carry_partition_offsets() {
        let descs = vec![desc(1, &[1, 2]), desc(2, &[3]), desc(3, &[4])];

        let reports = local(&descs, 7, 2).run();
        let offsets: Vec<_> = reports.iter().map(|r| r.partition_offset).collect();
        assert_eq!(offsets, vec![Some(0), Some(2), Some(4)]);

        let reports = global(&descs, 7, 2).run();
        assert!(reports.iter().all(|r| r.partition_offset.is_none()));
    }

    #[test]
    fn test_finish_after_last_access() {
        let descs = vec![desc(1, &[1, 2, 1]), desc(2, &[3, 3, 4]), desc(3, &[5])];
        let mut sched = global(&descs, 3, 1).with_trace();
        let reports = sched.run();

        for report in &reports {
            let last_hit = sched
                .events()
                .iter()
                .filter_map(|e| match e {
                    SimEvent::Hit { time, pid, .. } if *pid == report.id => Some(*time),
                    _ => None,
                })
                .max()
                .unwrap();
            assert!(report.turnaround_time > last_hit);
        }
    }

    #[test]
    fn test_faults_bounded_by_distinct_pages() {
        // enough frames that nothing is ever evicted
        let descs = vec![desc(1, &[1, 2, 1, 2, 3, 1]), desc(2, &[7, 7, 8, 7])];
        let reports = global(&descs, 6, 2).run();
        assert_eq!(reports[0].fault_count, 3);
        assert_eq!(reports[1].fault_count, 2);
    }

    #[test]
    fn test_empty_process_never_queued() {
        let descs = vec![desc(1, &[]), desc(2, &[4])];
        let mut sched = global(&descs, 2, 2);
        assert_eq!(sched.ready_ids(), vec![2]);

        let reports = sched.run();
        assert_eq!(reports[0].turnaround_time, 0);
        assert_eq!(reports[0].fault_count, 0);
        assert_eq!(reports[1].turnaround_time, 5);
    }

    #[test]
    fn test_dispatch_after_done_is_noop() {
        let descs = vec![desc(1, &[1])];
        let mut sched = global(&descs, 1, 1);
        sched.run();
        let clock = sched.clock();
        sched.dispatch();
        assert_eq!(sched.clock(), clock);
    }

    #[test]
    fn test_insufficient_frames_rejected() {
        let descs = vec![desc(1, &[1]), desc(2, &[2])];
        let err = Scheduler::new(&descs, 1, 2, FixedLocal::new).err().unwrap();
        assert_eq!(err, SimError::InsufficientFrames { frames: 1, processes: 2 });
        assert!(Scheduler::new(&descs, 1, 2, |f, _| GlobalFifo::new(f)).is_err());
    }

    #[test]
    fn test_validate_config() {
        let descs = vec![desc(1, &[1]), desc(1, &[2])];
        assert_eq!(validate(&descs, 4, 1), Err(SimError::DuplicateProcessId(1)));
        assert_eq!(validate(&descs[..1], 4, 0), Err(SimError::InvalidQuantum));
        assert_eq!(validate(&[], 4, 1), Err(SimError::NoProcesses));
        assert_eq!(validate(&descs[..1], 1, 1), Ok(()));

        let big = ProcessDescriptor { id: 3, name: "big".to_string(), pages: vec![0; 51] };
        assert!(matches!(validate(&[big], 4, 1), Err(SimError::TooManyPages { .. })));
    }
}
