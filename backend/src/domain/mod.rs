//! # Domain Module
//!
//! Business rules for the viáticos tracker, independent of any UI framework
//! or storage backend.
//!
//! - **money**: lenient vs strict numeric parsing of user-entered amounts
//! - **calculation**: the pure totals engine (expenses, fuel, balance)
//! - **dates**: trip date-range validation
//! - **trip_form**: form state transitions with automatic recalculation
//! - **trip_service**: the save/delete orchestration over storage
//! - **share**: the plain-text trip summary for the share sheet

pub mod calculation;
pub mod dates;
pub mod money;
pub mod share;
pub mod trip_form;
pub mod trip_service;

pub use trip_service::*;
