//! Synthetic attendance: generation, reconciliation into the store, and the
//! daily schedule that drives it.

pub mod generator;
pub mod reconciler;
pub mod scheduler;

pub use reconciler::Reconciler;
pub use scheduler::DailySchedule;
