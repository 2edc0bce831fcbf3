//! SQLite repository for the trip aggregate.
//!
//! Every multi-row write runs inside one transaction; the fuel set is
//! always written or removed as a complete unit (replace, never merge).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};
use tracing::debug;

use shared::{BalanceType, FuelEntry, Trip, TripStatus, TripWithFuel};

use crate::storage::connection::DbConnection;
use crate::storage::feed::TripFeed;
use crate::storage::traits::TripStorage;

/// Repository for trip aggregate operations
#[derive(Clone)]
pub struct TripRepository {
    db: DbConnection,
}

impl TripRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Open a reactive feed over the listing (no query) or a search.
    pub fn watch(&self, query: Option<String>) -> TripFeed {
        TripFeed::new(self.clone(), query)
    }

    pub(crate) fn db(&self) -> &DbConnection {
        &self.db
    }

    async fn fuel_entries_for(&self, trip_id: i64) -> Result<Vec<FuelEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM fuel_entries
            WHERE trip_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(trip_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(fuel_entry_from_row).collect()
    }

    async fn join_fuel(&self, trips: Vec<Trip>) -> Result<Vec<TripWithFuel>> {
        let mut result = Vec::with_capacity(trips.len());
        for trip in trips {
            let fuel_entries = match trip.id {
                Some(trip_id) => self.fuel_entries_for(trip_id).await?,
                None => Vec::new(),
            };
            result.push(TripWithFuel { trip, fuel_entries });
        }
        Ok(result)
    }
}

#[async_trait]
impl TripStorage for TripRepository {
    async fn list_trips(&self) -> Result<Vec<TripWithFuel>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM trips
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let trips = rows.iter().map(trip_from_row).collect::<Result<Vec<_>>>()?;
        self.join_fuel(trips).await
    }

    async fn search_trips(&self, query: &str) -> Result<Vec<TripWithFuel>> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query(
            r#"
            SELECT * FROM trips
            WHERE gret_number LIKE ? OR driver_name LIKE ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(self.db.pool())
        .await?;

        let trips = rows.iter().map(trip_from_row).collect::<Result<Vec<_>>>()?;
        self.join_fuel(trips).await
    }

    async fn get_trip_by_id(&self, trip_id: i64) -> Result<Option<TripWithFuel>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM trips WHERE id = ?
            "#,
        )
        .bind(trip_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => {
                let trip = trip_from_row(&row)?;
                let fuel_entries = self.fuel_entries_for(trip_id).await?;
                Ok(Some(TripWithFuel { trip, fuel_entries }))
            }
            None => Ok(None),
        }
    }

    async fn get_trip_by_gret(&self, gret_number: &str) -> Result<Option<Trip>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM trips WHERE gret_number = ? LIMIT 1
            "#,
        )
        .bind(gret_number)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(trip_from_row).transpose()
    }

    async fn insert_trip_with_fuel(&self, trip: &Trip, fuel_entries: &[FuelEntry]) -> Result<i64> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO trips (
                gret_number, driver_name, truck_plate, date_start, date_end,
                viatic_amount, loading_cost, unloading_cost, weighing_cost,
                parking_cost, tolls_cost, taxi_cost, washing_cost, copies_cost,
                helper_cost, security_cost, other_cost, other_description,
                total_expenses, total_fuel_calculated, total_fuel_real,
                balance, balance_type, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trip.gret_number)
        .bind(&trip.driver_name)
        .bind(&trip.truck_plate)
        .bind(&trip.date_start)
        .bind(&trip.date_end)
        .bind(trip.viatic_amount)
        .bind(trip.loading_cost)
        .bind(trip.unloading_cost)
        .bind(trip.weighing_cost)
        .bind(trip.parking_cost)
        .bind(trip.tolls_cost)
        .bind(trip.taxi_cost)
        .bind(trip.washing_cost)
        .bind(trip.copies_cost)
        .bind(trip.helper_cost)
        .bind(trip.security_cost)
        .bind(trip.other_cost)
        .bind(&trip.other_description)
        .bind(trip.total_expenses)
        .bind(trip.total_fuel_calculated)
        .bind(trip.total_fuel_real)
        .bind(trip.balance)
        .bind(trip.balance_type.as_str())
        .bind(trip.status.as_str())
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&mut *tx)
        .await?;

        let trip_id = result.last_insert_rowid();
        for entry in fuel_entries {
            insert_fuel_entry(&mut tx, trip_id, entry).await?;
        }

        tx.commit().await?;
        debug!(trip_id, entries = fuel_entries.len(), "trip inserted");
        self.db.notify_change();
        Ok(trip_id)
    }

    async fn update_trip_with_fuel(&self, trip: &Trip, fuel_entries: &[FuelEntry]) -> Result<()> {
        let trip_id = trip
            .id
            .ok_or_else(|| anyhow!("cannot update a trip that was never persisted"))?;

        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            UPDATE trips SET
                gret_number = ?, driver_name = ?, truck_plate = ?,
                date_start = ?, date_end = ?, viatic_amount = ?,
                loading_cost = ?, unloading_cost = ?, weighing_cost = ?,
                parking_cost = ?, tolls_cost = ?, taxi_cost = ?,
                washing_cost = ?, copies_cost = ?, helper_cost = ?,
                security_cost = ?, other_cost = ?, other_description = ?,
                total_expenses = ?, total_fuel_calculated = ?,
                total_fuel_real = ?, balance = ?, balance_type = ?,
                status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&trip.gret_number)
        .bind(&trip.driver_name)
        .bind(&trip.truck_plate)
        .bind(&trip.date_start)
        .bind(&trip.date_end)
        .bind(trip.viatic_amount)
        .bind(trip.loading_cost)
        .bind(trip.unloading_cost)
        .bind(trip.weighing_cost)
        .bind(trip.parking_cost)
        .bind(trip.tolls_cost)
        .bind(trip.taxi_cost)
        .bind(trip.washing_cost)
        .bind(trip.copies_cost)
        .bind(trip.helper_cost)
        .bind(trip.security_cost)
        .bind(trip.other_cost)
        .bind(&trip.other_description)
        .bind(trip.total_expenses)
        .bind(trip.total_fuel_calculated)
        .bind(trip.total_fuel_real)
        .bind(trip.balance)
        .bind(trip.balance_type.as_str())
        .bind(trip.status.as_str())
        .bind(trip.updated_at)
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;

        // Replace the whole fuel set; never merge
        sqlx::query("DELETE FROM fuel_entries WHERE trip_id = ?")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;
        for entry in fuel_entries {
            insert_fuel_entry(&mut tx, trip_id, entry).await?;
        }

        tx.commit().await?;
        debug!(trip_id, entries = fuel_entries.len(), "trip updated");
        self.db.notify_change();
        Ok(())
    }

    async fn delete_trip(&self, trip_id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM fuel_entries WHERE trip_id = ?")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(trip_id, "trip deleted");
        self.db.notify_change();
        Ok(())
    }
}

async fn insert_fuel_entry(
    tx: &mut Transaction<'_, Sqlite>,
    trip_id: i64,
    entry: &FuelEntry,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO fuel_entries (
            trip_id, fuel_date, gallons, price_per_gallon,
            calculated_amount, real_paid_amount
        )
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(trip_id)
    .bind(&entry.fuel_date)
    .bind(entry.gallons)
    .bind(entry.price_per_gallon)
    .bind(entry.calculated_amount)
    .bind(entry.real_paid_amount)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn trip_from_row(row: &SqliteRow) -> Result<Trip> {
    let balance_type: String = row.get("balance_type");
    let status: String = row.get("status");
    Ok(Trip {
        id: Some(row.get("id")),
        gret_number: row.get("gret_number"),
        driver_name: row.get("driver_name"),
        truck_plate: row.get("truck_plate"),
        date_start: row.get("date_start"),
        date_end: row.get("date_end"),
        viatic_amount: row.get("viatic_amount"),
        loading_cost: row.get("loading_cost"),
        unloading_cost: row.get("unloading_cost"),
        weighing_cost: row.get("weighing_cost"),
        parking_cost: row.get("parking_cost"),
        tolls_cost: row.get("tolls_cost"),
        taxi_cost: row.get("taxi_cost"),
        washing_cost: row.get("washing_cost"),
        copies_cost: row.get("copies_cost"),
        helper_cost: row.get("helper_cost"),
        security_cost: row.get("security_cost"),
        other_cost: row.get("other_cost"),
        other_description: row.get("other_description"),
        total_expenses: row.get("total_expenses"),
        total_fuel_calculated: row.get("total_fuel_calculated"),
        total_fuel_real: row.get("total_fuel_real"),
        balance: row.get("balance"),
        balance_type: BalanceType::parse(&balance_type)
            .ok_or_else(|| anyhow!("unknown balance type: {balance_type}"))?,
        status: TripStatus::parse(&status).ok_or_else(|| anyhow!("unknown status: {status}"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn fuel_entry_from_row(row: &SqliteRow) -> Result<FuelEntry> {
    Ok(FuelEntry {
        id: Some(row.get("id")),
        trip_id: row.get("trip_id"),
        fuel_date: row.get("fuel_date"),
        gallons: row.get("gallons"),
        price_per_gallon: row.get("price_per_gallon"),
        calculated_amount: row.get("calculated_amount"),
        real_paid_amount: row.get("real_paid_amount"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Setup a new test database for each test
    async fn setup_test() -> TripRepository {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        TripRepository::new(db)
    }

    fn sample_trip(gret: &str, created_at: i64) -> Trip {
        Trip {
            id: None,
            gret_number: gret.to_string(),
            driver_name: "Juan Pérez".to_string(),
            truck_plate: "ABC-123".to_string(),
            date_start: "2024-05-01".to_string(),
            date_end: Some("2024-05-03".to_string()),
            viatic_amount: 100.0,
            loading_cost: 20.0,
            unloading_cost: 0.0,
            weighing_cost: 0.0,
            parking_cost: 0.0,
            tolls_cost: 10.0,
            taxi_cost: 0.0,
            washing_cost: 0.0,
            copies_cost: 0.0,
            helper_cost: 0.0,
            security_cost: 0.0,
            other_cost: 0.0,
            other_description: None,
            total_expenses: 72.0,
            total_fuel_calculated: 40.0,
            total_fuel_real: 42.0,
            balance: 28.0,
            balance_type: BalanceType::AFavor,
            status: TripStatus::Abierto,
            created_at,
            updated_at: created_at,
        }
    }

    fn sample_fuel(gallons: f64, price: f64, real_paid: f64) -> FuelEntry {
        FuelEntry {
            id: None,
            trip_id: 0,
            fuel_date: Some("2024-05-02".to_string()),
            gallons,
            price_per_gallon: price,
            calculated_amount: gallons * price,
            real_paid_amount: real_paid,
        }
    }

    async fn fuel_row_count(repo: &TripRepository) -> i64 {
        sqlx::query("SELECT COUNT(*) AS n FROM fuel_entries")
            .fetch_one(repo.db.pool())
            .await
            .expect("Failed to count fuel entries")
            .get("n")
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = setup_test().await;

        let trip = sample_trip("G-100", 1);
        let fuel = vec![sample_fuel(10.0, 4.0, 42.0), sample_fuel(5.0, 4.2, 21.0)];
        let trip_id = repo
            .insert_trip_with_fuel(&trip, &fuel)
            .await
            .expect("Failed to insert trip");

        let loaded = repo
            .get_trip_by_id(trip_id)
            .await
            .expect("Failed to load trip")
            .expect("Trip should exist");

        assert_eq!(loaded.trip.id, Some(trip_id));
        assert_eq!(loaded.trip.gret_number, "G-100");
        assert_eq!(loaded.trip.driver_name, "Juan Pérez");
        assert_eq!(loaded.trip.date_end.as_deref(), Some("2024-05-03"));
        assert_eq!(loaded.trip.total_expenses, 72.0);
        assert_eq!(loaded.trip.balance_type, BalanceType::AFavor);
        assert_eq!(loaded.trip.status, TripStatus::Abierto);

        assert_eq!(loaded.fuel_entries.len(), 2);
        assert_eq!(loaded.fuel_entries[0].trip_id, trip_id);
        assert_eq!(loaded.fuel_entries[0].gallons, 10.0);
        assert_eq!(loaded.fuel_entries[0].calculated_amount, 40.0);
        assert_eq!(loaded.fuel_entries[1].real_paid_amount, 21.0);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let repo = setup_test().await;

        for (gret, created_at) in [("G-1", 100), ("G-2", 200), ("G-3", 300)] {
            repo.insert_trip_with_fuel(&sample_trip(gret, created_at), &[])
                .await
                .expect("Failed to insert trip");
        }

        let trips = repo.list_trips().await.expect("Failed to list trips");
        assert_eq!(trips.len(), 3);
        assert_eq!(trips[0].trip.gret_number, "G-3");
        assert_eq!(trips[1].trip.gret_number, "G-2");
        assert_eq!(trips[2].trip.gret_number, "G-1");
    }

    #[tokio::test]
    async fn test_search_matches_gret_or_driver_case_insensitive() {
        let repo = setup_test().await;

        let mut first = sample_trip("G-100", 1);
        first.driver_name = "Carlos Quispe".to_string();
        repo.insert_trip_with_fuel(&first, &[])
            .await
            .expect("Failed to insert trip");
        let mut second = sample_trip("X-200", 2);
        second.driver_name = "Juan Pérez".to_string();
        repo.insert_trip_with_fuel(&second, &[])
            .await
            .expect("Failed to insert trip");

        let by_gret = repo.search_trips("g-1").await.expect("Failed to search");
        assert_eq!(by_gret.len(), 1);
        assert_eq!(by_gret[0].trip.gret_number, "G-100");

        let by_driver = repo.search_trips("juan").await.expect("Failed to search");
        assert_eq!(by_driver.len(), 1);
        assert_eq!(by_driver[0].trip.gret_number, "X-200");

        let none = repo.search_trips("zzz").await.expect("Failed to search");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_gret_returns_trip_row_only() {
        let repo = setup_test().await;

        let trip_id = repo
            .insert_trip_with_fuel(&sample_trip("G-100", 1), &[sample_fuel(10.0, 4.0, 42.0)])
            .await
            .expect("Failed to insert trip");

        let found = repo
            .get_trip_by_gret("G-100")
            .await
            .expect("Failed to look up gret")
            .expect("Trip should exist");
        assert_eq!(found.id, Some(trip_id));

        let missing = repo
            .get_trip_by_gret("G-999")
            .await
            .expect("Failed to look up gret");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_gret_insert_fails_whole_transaction() {
        let repo = setup_test().await;

        repo.insert_trip_with_fuel(&sample_trip("G-100", 1), &[sample_fuel(10.0, 4.0, 42.0)])
            .await
            .expect("Failed to insert first trip");

        let result = repo
            .insert_trip_with_fuel(&sample_trip("G-100", 2), &[sample_fuel(5.0, 4.0, 20.0)])
            .await;
        assert!(result.is_err(), "Duplicate gret must fail the insert");

        // Nothing from the failed transaction may remain
        let trips = repo.list_trips().await.expect("Failed to list trips");
        assert_eq!(trips.len(), 1);
        assert_eq!(fuel_row_count(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_fuel_set() {
        let repo = setup_test().await;

        let fuel = vec![
            sample_fuel(10.0, 4.0, 42.0),
            sample_fuel(5.0, 4.0, 20.0),
            sample_fuel(2.0, 4.0, 8.0),
        ];
        let trip_id = repo
            .insert_trip_with_fuel(&sample_trip("G-100", 1), &fuel)
            .await
            .expect("Failed to insert trip");

        let mut updated = sample_trip("G-100", 1);
        updated.id = Some(trip_id);
        updated.driver_name = "Pedro Rojas".to_string();
        updated.updated_at = 2;
        repo.update_trip_with_fuel(&updated, &[sample_fuel(7.0, 3.9, 27.3)])
            .await
            .expect("Failed to update trip");

        let loaded = repo
            .get_trip_by_id(trip_id)
            .await
            .expect("Failed to load trip")
            .expect("Trip should exist");
        assert_eq!(loaded.trip.driver_name, "Pedro Rojas");
        assert_eq!(loaded.fuel_entries.len(), 1);
        assert_eq!(loaded.fuel_entries[0].gallons, 7.0);

        // Replace semantics must not leave orphaned old entries
        assert_eq!(fuel_row_count(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_trip_and_fuel() {
        let repo = setup_test().await;

        let trip_id = repo
            .insert_trip_with_fuel(&sample_trip("G-100", 1), &[sample_fuel(10.0, 4.0, 42.0)])
            .await
            .expect("Failed to insert trip");

        // A negative gallons value violates the CHECK constraint midway
        // through the transaction, after the trip row was already updated
        let mut updated = sample_trip("G-100", 1);
        updated.id = Some(trip_id);
        updated.driver_name = "Pedro Rojas".to_string();
        let result = repo
            .update_trip_with_fuel(&updated, &[sample_fuel(-5.0, 4.0, 20.0)])
            .await;
        assert!(result.is_err(), "Constraint violation must fail the update");

        let loaded = repo
            .get_trip_by_id(trip_id)
            .await
            .expect("Failed to load trip")
            .expect("Trip should exist");
        assert_eq!(loaded.trip.driver_name, "Juan Pérez");
        assert_eq!(loaded.fuel_entries.len(), 1);
        assert_eq!(loaded.fuel_entries[0].gallons, 10.0);
        assert_eq!(loaded.fuel_entries[0].real_paid_amount, 42.0);
    }

    #[tokio::test]
    async fn test_delete_removes_trip_and_fuel_atomically() {
        let repo = setup_test().await;

        let fuel = vec![
            sample_fuel(10.0, 4.0, 42.0),
            sample_fuel(5.0, 4.0, 20.0),
            sample_fuel(2.0, 4.0, 8.0),
        ];
        let trip_id = repo
            .insert_trip_with_fuel(&sample_trip("G-100", 1), &fuel)
            .await
            .expect("Failed to insert trip");

        repo.delete_trip(trip_id).await.expect("Failed to delete trip");

        let loaded = repo.get_trip_by_id(trip_id).await.expect("Failed to load");
        assert!(loaded.is_none());
        assert_eq!(fuel_row_count(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected() {
        let repo = setup_test().await;
        let result = repo.update_trip_with_fuel(&sample_trip("G-100", 1), &[]).await;
        assert!(result.is_err());
    }
}
