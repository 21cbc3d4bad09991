use std::fmt;

use crate::constants::*;

/// Everything that can stop a simulation from starting or a process from
/// being admitted. Nothing here is raised once a run is underway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// `frames / processes < 1`
    InsufficientFrames { frames: usize, processes: usize },
    NoProcesses,
    InvalidQuantum,
    TooManyPages { name: String, count: usize },
    DuplicateProcessId(Pid),
    /// A description file that could not be turned into a process.
    MalformedDescriptor { source: String, reason: String },
    Io { path: String, message: String },
}

impl SimError {
    /// Configuration errors (including the page limit) reject the whole
    /// run; the rest only exclude the offending process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SimError::MalformedDescriptor { .. } | SimError::Io { .. })
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InsufficientFrames { frames, processes } => write!(
                f,
                "Insufficient frames: {} frames for {} processes. Each process must have at least 1 frame.",
                frames, processes
            ),
            SimError::NoProcesses => write!(f, "No processes to simulate"),
            SimError::InvalidQuantum => write!(f, "Time quantum must be a positive integer"),
            SimError::TooManyPages { name, count } => write!(
                f,
                "Process \"{}\" exceeds maximum of {} pages ({} found)",
                name, MAX_PAGES_PER_PROCESS, count
            ),
            SimError::DuplicateProcessId(id) => write!(f, "Process id {} is used more than once", id),
            SimError::MalformedDescriptor { source, reason } => {
                write!(f, "Malformed process description {}: {}", source, reason)
            }
            SimError::Io { path, message } => write!(f, "{}: {}", path, message),
        }
    }
}

impl std::error::Error for SimError {}
