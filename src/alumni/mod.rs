//! Alumni Records
//! Mission: Store and query alumni by student number, cohort and major

pub mod models;
pub mod store;

pub use models::{Alumni, AlumniInput};
pub use store::{AlumniStore, DuplicateAlumni, ALUMNI_SORTABLE};
