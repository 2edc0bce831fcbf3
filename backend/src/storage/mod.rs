//! # Storage Module
//!
//! Persistence for trips, fuel entries and driver preferences.
//!
//! The domain layer talks to the traits in [`traits`]; the SQLite
//! implementations live in [`sqlite`]. [`connection`] owns the pool, the
//! schema and the change channel that [`feed`] turns into reactive query
//! subscriptions.

pub mod connection;
pub mod feed;
pub mod sqlite;
pub mod traits;

pub use connection::DbConnection;
pub use feed::TripFeed;
pub use sqlite::{PreferenceRepository, TripRepository};
pub use traits::{PreferenceStorage, TripStorage};
