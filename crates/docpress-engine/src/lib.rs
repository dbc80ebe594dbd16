//! # docpress-engine
//!
//! The job execution core of DocPress: the admission controller that
//! bounds concurrent conversion work, the executor that enforces
//! wall-clock budgets and guarantees artifact cleanup, the per-job
//! artifact tracker, the external tool probe, and the background reaper.

pub mod admission;
pub mod artifacts;
pub mod executor;
pub mod job;
pub mod probe;
pub mod reaper;
pub mod workspace;

pub use admission::{AdmissionController, AdmissionPermit, SlotOccupancy};
pub use artifacts::ArtifactSet;
pub use executor::{JobExecutor, JobOutput};
pub use job::{Job, JobId, JobKind};
pub use probe::{ToolAvailability, ToolProbe};
pub use reaper::Reaper;
pub use workspace::Workspace;
