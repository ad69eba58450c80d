//! Storage is organized through [kv_store::KeyValueStore] and the typed [tally_store::TallyStore].
//!  - `trackedSites` holds the hostnames the user measures.
//!  - `today` holds the running [entities::DayRecord].
//!  - `history` holds the archived day totals, newest first.

pub mod entities;
pub mod kv_store;
pub mod tally_store;
