//! SQLite implementations of the storage traits.

pub mod preference_repository;
pub mod trip_repository;

pub use preference_repository::PreferenceRepository;
pub use trip_repository::TripRepository;
