pub mod constants;
pub mod error;
pub mod io;
pub mod memory;
pub mod policy;
pub mod process;
pub mod report;
pub mod scheduler;
pub mod simulation;

// Re-export commonly used items for convenience
pub use constants::*;
pub use error::SimError;
pub use process::{Process, ProcessDescriptor};
pub use report::{PolicyReport, ProcessReport};
pub use scheduler::{Scheduler, SimEvent};
pub use simulation::{PolicyKind, SimConfig, run_comparison, run_policies, run_policy};
