use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;
use voyage_core::CoreError;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Translates driver errors into domain errors. `entity` names the table's
/// record for messages.
pub(crate) fn map_db_error(entity: &str, err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CoreError::AlreadyExists(entity.to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            CoreError::Validation(format!("{entity} references a missing or protected record"))
        }
        sqlx::Error::Database(db) if db.is_check_violation() => {
            CoreError::Validation(db.message().to_string())
        }
        _ => CoreError::Storage(err.to_string()),
    }
}
