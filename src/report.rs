use serde::Serialize;

use crate::constants::*;
use crate::process::Process;

/// Per-process outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub id: Pid,
    pub name: String,
    pub turnaround_time: Tick,
    pub fault_count: usize,
    pub fault_times: Vec<Tick>,
    /// First frame of the process's fixed segment, when memory is partitioned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_offset: Option<usize>,
}

impl ProcessReport {
    pub fn from_process(process: &Process) -> Self {
        ProcessReport {
            id: process.id(),
            name: process.name().to_string(),
            // only read after a run, when every process has finished
            turnaround_time: process.turnaround_time().unwrap_or(ARRIVAL_TIME),
            fault_count: process.fault_times().len(),
            fault_times: process.fault_times().to_vec(),
            partition_offset: process.partition_offset(),
        }
    }
}

/// The reports of one policy's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyReport {
    pub policy: String,
    pub processes: Vec<ProcessReport>,
}

/// Format fault times as `{0, 5, 10}`
pub fn format_fault_times(times: &[Tick]) -> String {
    let inner: Vec<String> = times.iter().map(|t| t.to_string()).collect();
    format!("{{{}}}", inner.join(", "))
}

/// Render one policy's results as a fixed-width table.
pub fn render_table(report: &PolicyReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("FIFO - {}:\n", report.policy));
    out.push_str(&format!(
        "{:<4} {:<20} {:<16} {:<9} {}\n",
        "PID", "Process Name", "Turnaround Time", "# Faults", "Fault Times"
    ));
    for p in &report.processes {
        out.push_str(&format!(
            "{:<4} {:<20} {:<16} {:<9} {}\n",
            p.id,
            p.name,
            p.turnaround_time,
            p.fault_count,
            format_fault_times(&p.fault_times)
        ));
    }
    out
}

/// Render several runs one after another, separated by a dashed line.
pub fn render_tables(reports: &[PolicyReport]) -> String {
    let separator = format!("{}\n", "-".repeat(REPORT_SEPARATOR_WIDTH));
    reports.iter().map(render_table).collect::<Vec<_>>().join(&separator)
}

pub fn render_json(reports: &[PolicyReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}
