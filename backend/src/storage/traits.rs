//! # Storage Traits
//!
//! Abstraction seams between the domain layer and the concrete storage
//! backend, so services hold `Arc<dyn …>` handles and tests can substitute
//! doubles.

use anyhow::Result;
use async_trait::async_trait;
use shared::{DriverDefaults, FuelEntry, Trip, TripWithFuel};

/// Transactional access to the trip aggregate (a trip plus the fuel-entry
/// set it exclusively owns).
///
/// Every multi-row write happens in one all-or-nothing transaction: no
/// caller ever observes a trip with a partially written fuel set, nor a
/// fuel entry without its owning trip.
#[async_trait]
pub trait TripStorage: Send + Sync {
    /// All trips joined with their fuel entries, newest first.
    async fn list_trips(&self) -> Result<Vec<TripWithFuel>>;

    /// Case-insensitive substring search on GRET number or driver name,
    /// newest first.
    async fn search_trips(&self, query: &str) -> Result<Vec<TripWithFuel>>;

    /// One aggregate by row id, or None when it no longer exists.
    async fn get_trip_by_id(&self, trip_id: i64) -> Result<Option<TripWithFuel>>;

    /// Trip row only (no fuel join); used by the duplicate-key check.
    async fn get_trip_by_gret(&self, gret_number: &str) -> Result<Option<Trip>>;

    /// Insert the trip and its fuel set in one transaction, stamping the
    /// entries with the freshly assigned trip id. Returns that id. A
    /// duplicate GRET number fails the whole transaction.
    async fn insert_trip_with_fuel(&self, trip: &Trip, fuel_entries: &[FuelEntry]) -> Result<i64>;

    /// Update the trip row and replace its whole fuel set (delete all, then
    /// insert the new set) in one transaction.
    async fn update_trip_with_fuel(&self, trip: &Trip, fuel_entries: &[FuelEntry]) -> Result<()>;

    /// Delete the fuel set and the trip row in one transaction.
    async fn delete_trip(&self, trip_id: i64) -> Result<()>;
}

/// Remembered driver defaults for pre-filling new trip forms.
#[async_trait]
pub trait PreferenceStorage: Send + Sync {
    /// The remembered defaults. Read errors collapse to empty strings; this
    /// never fails the caller.
    async fn driver_defaults(&self) -> DriverDefaults;

    /// Persist both defaults.
    async fn save_driver_defaults(&self, defaults: &DriverDefaults) -> Result<()>;
}
