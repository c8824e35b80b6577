//! Detection, classification and deal push.
//!
//! Everything here works on models and repository functions; fetching
//! lives in [`crate::scrapers`].

pub mod change_detection;
pub mod classifier;
pub mod deal_push;
pub mod pipeline;
pub mod scheduler;

pub use change_detection::{compute_hash, ChangeState, FirstSightPolicy};
pub use classifier::Classifier;
pub use deal_push::build_deal;
pub use pipeline::{CycleReport, Pipeline, PipelineError, CYCLE_LOCK};
pub use scheduler::{Scheduler, SchedulerHandle};
