use anyhow::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:viaticos.db";

// Committed mutations are rare (single user), so a small buffer is plenty;
// lagged feeds refetch the full result set anyway.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// DbConnection manages the SQLite pool, the schema and the change channel
/// that backs reactive trip queries.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
    changes: broadcast::Sender<()>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Foreign keys must be on for the fuel-entry cascade; the CHECK and
        // UNIQUE constraints below are defense-in-depth behind the
        // application-level validation.
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            pool: Arc::new(pool),
            changes,
        })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Subscribe to commit notifications: one tick per committed mutation.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }

    /// Wake every subscribed feed. Having no receivers is fine.
    pub(crate) fn notify_change(&self) {
        let _ = self.changes.send(());
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Create trips table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trips (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                gret_number TEXT NOT NULL,
                driver_name TEXT NOT NULL,
                truck_plate TEXT NOT NULL,
                date_start TEXT NOT NULL,
                date_end TEXT,
                viatic_amount REAL NOT NULL DEFAULT 0 CHECK (viatic_amount >= 0),
                loading_cost REAL NOT NULL DEFAULT 0 CHECK (loading_cost >= 0),
                unloading_cost REAL NOT NULL DEFAULT 0 CHECK (unloading_cost >= 0),
                weighing_cost REAL NOT NULL DEFAULT 0 CHECK (weighing_cost >= 0),
                parking_cost REAL NOT NULL DEFAULT 0 CHECK (parking_cost >= 0),
                tolls_cost REAL NOT NULL DEFAULT 0 CHECK (tolls_cost >= 0),
                taxi_cost REAL NOT NULL DEFAULT 0 CHECK (taxi_cost >= 0),
                washing_cost REAL NOT NULL DEFAULT 0 CHECK (washing_cost >= 0),
                copies_cost REAL NOT NULL DEFAULT 0 CHECK (copies_cost >= 0),
                helper_cost REAL NOT NULL DEFAULT 0 CHECK (helper_cost >= 0),
                security_cost REAL NOT NULL DEFAULT 0 CHECK (security_cost >= 0),
                other_cost REAL NOT NULL DEFAULT 0 CHECK (other_cost >= 0),
                other_description TEXT,
                total_expenses REAL NOT NULL DEFAULT 0,
                total_fuel_calculated REAL NOT NULL DEFAULT 0,
                total_fuel_real REAL NOT NULL DEFAULT 0,
                balance REAL NOT NULL DEFAULT 0,
                balance_type TEXT NOT NULL DEFAULT 'NEUTRO',
                status TEXT NOT NULL DEFAULT 'ABIERTO',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // The GRET number is the business key: unique across all trips
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_trips_gret_number
            ON trips(gret_number);
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for listing newest first
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_trips_created_at
            ON trips(created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // Create fuel_entries table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fuel_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trip_id INTEGER NOT NULL,
                fuel_date TEXT,
                gallons REAL NOT NULL DEFAULT 0 CHECK (gallons >= 0),
                price_per_gallon REAL NOT NULL DEFAULT 0 CHECK (price_per_gallon >= 0),
                calculated_amount REAL NOT NULL DEFAULT 0,
                real_paid_amount REAL NOT NULL DEFAULT 0 CHECK (real_paid_amount >= 0),
                FOREIGN KEY (trip_id) REFERENCES trips (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for the fuel join
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_fuel_entries_trip_id
            ON fuel_entries(trip_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Create driver_preferences key-value table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS driver_preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
