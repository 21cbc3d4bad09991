//! Driver-level API: pick a policy, run it, compare both.

use std::fmt;
use std::str::FromStr;

use log::info;

use crate::error::SimError;
use crate::policy::{FixedLocal, GlobalFifo, ReplacementPolicy};
use crate::process::ProcessDescriptor;
use crate::report::PolicyReport;
use crate::scheduler::{self, Scheduler, SimEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub frames: usize,
    pub quantum: u32,
}

impl SimConfig {
    pub fn new(frames: usize, quantum: u32) -> Self {
        SimConfig { frames, quantum }
    }

    pub fn validate(&self, descriptors: &[ProcessDescriptor]) -> Result<(), SimError> {
        scheduler::validate(descriptors, self.frames, self.quantum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    FixedLocal,
    VariableGlobal,
}

impl PolicyKind {
    /// Both policies, in the order they are reported.
    pub const ALL: [PolicyKind; 2] = [PolicyKind::FixedLocal, PolicyKind::VariableGlobal];
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::FixedLocal => write!(f, "local"),
            PolicyKind::VariableGlobal => write!(f, "global"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "fixed-local" => Ok(PolicyKind::FixedLocal),
            "global" | "variable-global" => Ok(PolicyKind::VariableGlobal),
            _ => Err(format!("Unknown policy: {}", s)),
        }
    }
}

/// Result of one run plus its event trace (empty unless requested).
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: PolicyReport,
    pub events: Vec<SimEvent>,
}

/// Run one policy over fresh state derived from `descriptors`.
pub fn run_policy(
    kind: PolicyKind,
    descriptors: &[ProcessDescriptor],
    config: SimConfig,
    trace: bool,
) -> Result<RunOutput, SimError> {
    match kind {
        PolicyKind::FixedLocal => {
            let sched = Scheduler::new(descriptors, config.frames, config.quantum, FixedLocal::new)?;
            Ok(execute(sched, trace))
        }
        PolicyKind::VariableGlobal => {
            let sched = Scheduler::new(descriptors, config.frames, config.quantum, |frames, _| {
                GlobalFifo::new(frames)
            })?;
            Ok(execute(sched, trace))
        }
    }
}

fn execute<P: ReplacementPolicy>(sched: Scheduler<P>, trace: bool) -> RunOutput {
    let mut sched = if trace { sched.with_trace() } else { sched };
    let processes = sched.run();
    RunOutput {
        report: PolicyReport {
            policy: sched.policy().name().to_string(),
            processes,
        },
        events: sched.events().to_vec(),
    }
}

/// Run each requested policy in turn over the same descriptors. The
/// configuration is checked once, before anything runs.
pub fn run_policies(
    kinds: &[PolicyKind],
    descriptors: &[ProcessDescriptor],
    config: SimConfig,
    trace: bool,
) -> Result<Vec<RunOutput>, SimError> {
    config.validate(descriptors)?;

    let mut outputs = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        info!("running {} replacement", kind);
        outputs.push(run_policy(kind, descriptors, config, trace)?);
    }
    Ok(outputs)
}

/// Fixed-local then variable-global.
pub fn run_comparison(descriptors: &[ProcessDescriptor], config: SimConfig) -> Result<Vec<PolicyReport>, SimError> {
    let outputs = run_policies(&PolicyKind::ALL, descriptors, config, false)?;
    Ok(outputs.into_iter().map(|o| o.report).collect())
}
