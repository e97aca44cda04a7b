//! The odontogram domain model.
//!
//! Everything in this module is pure, synchronous computation over in-memory
//! data: the closed tooth universe, the closed condition vocabulary, the
//! sparse chart snapshot with its default-fill rule, and the diff engine that
//! compares any two snapshots. Persistence lives in
//! [`crate::repositories::odontogram`]; nothing here touches the filesystem.

pub mod chart;
pub mod condition;
pub mod diff;
pub mod tooth;

pub use chart::{ToothChart, ToothState};
pub use condition::Condition;
pub use diff::{diff_charts, ChartChange};
pub use tooth::ToothId;
