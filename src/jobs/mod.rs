//! Employment History
//! Mission: Track where alumni work, with a recoverable trash

pub mod models;
pub mod store;

pub use models::{EmploymentStatus, Job, JobInput};
pub use store::{JobStore, UnknownAlumni, JOB_SORTABLE};
