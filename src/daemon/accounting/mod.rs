//! The time accounting core. [accountant::TimeAccountant] turns browser samples into persisted
//! per-site seconds, [rollover] moves finished days into the history.

pub mod accountant;
pub mod badge;
pub mod hostname;
pub mod rollover;
pub mod state;
