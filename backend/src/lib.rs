//! # Viáticos Tracker Backend
//!
//! Engine for a single-user trip and travel-allowance tracker: records
//! truck driver trips ("viajes"), their viático balances and fuel purchase
//! line items, computes expense totals and a balance classification, and
//! keeps each trip and its fuel entries transactionally consistent in
//! SQLite.
//!
//! The crate is UI-agnostic. A presentation shell drives it through:
//! - **domain**: business rules — pure calculation, validation, form state
//!   transitions, the save/delete orchestration and the share summary
//! - **storage**: persistence — SQLite repositories, the storage traits and
//!   the reactive trip feed

pub mod domain;
pub mod logging;
pub mod storage;
