//! Key-value store for the remembered driver defaults.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;
use tracing::warn;

use shared::DriverDefaults;

use crate::storage::connection::DbConnection;
use crate::storage::traits::PreferenceStorage;

const DRIVER_NAME_KEY: &str = "driver_name_default";
const TRUCK_PLATE_KEY: &str = "truck_plate_default";

/// Repository for driver preference operations
#[derive(Clone)]
pub struct PreferenceRepository {
    db: DbConnection,
}

impl PreferenceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    async fn read_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value FROM driver_preferences WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn write_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO driver_preferences (key, value)
            VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn read_or_empty(&self, key: &str) -> String {
        match self.read_value(key).await {
            Ok(value) => value.unwrap_or_default(),
            Err(error) => {
                warn!(key, %error, "failed to read driver preference");
                String::new()
            }
        }
    }
}

#[async_trait]
impl PreferenceStorage for PreferenceRepository {
    async fn driver_defaults(&self) -> DriverDefaults {
        DriverDefaults {
            driver_name: self.read_or_empty(DRIVER_NAME_KEY).await,
            truck_plate: self.read_or_empty(TRUCK_PLATE_KEY).await,
        }
    }

    async fn save_driver_defaults(&self, defaults: &DriverDefaults) -> Result<()> {
        self.write_value(DRIVER_NAME_KEY, &defaults.driver_name).await?;
        self.write_value(TRUCK_PLATE_KEY, &defaults.truck_plate).await?;
        Ok(())
    }
}
