//! The store client shared by every request handler.
//!
//! A [`Store`] wraps the sea-orm connection pool. It is built once at startup
//! and handed to the router, never looked up globally. Every public operation
//! runs in its own transaction and either commits or rolls back before
//! returning.

mod devices;
mod diary;

pub use devices::Registration;
pub use diary::{DiaryEntryPatch, NewDiaryEntry};

use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::entities::{user, User};
use crate::error::Error;
use crate::migrator::Migrator;

#[derive(Debug, Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options.max_connections(config.max_connections);
        Ok(Self::new(Database::connect(options).await?))
    }

    /// Brings the schema up to date. Already-applied migrations are skipped.
    pub async fn migrate(&self) -> Result<(), DbErr> {
        Migrator::up(&self.db, None).await
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn begin(&self) -> Result<DatabaseTransaction, Error> {
        Ok(self.db.begin().await?)
    }
}

/// Commits on success and rolls back on failure, consuming the transaction
/// either way.
async fn settle<T>(txn: DatabaseTransaction, result: Result<T, Error>) -> Result<T, Error> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!("rollback failed after {}: {}", err.kind(), rollback_err);
            }
            Err(err)
        }
    }
}

async fn find_user<C: ConnectionTrait>(
    conn: &C,
    device_id: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::DeviceId.eq(device_id))
        .one(conn)
        .await
}

async fn require_user<C: ConnectionTrait>(conn: &C, device_id: &str) -> Result<user::Model, Error> {
    find_user(conn, device_id)
        .await?
        .ok_or_else(|| Error::not_found("Device not registered"))
}

/// A migrated store on a private in-memory SQLite database.
#[cfg(test)]
pub(crate) async fn memory_store() -> Store {
    // A second pooled connection would open a second, empty database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let store = Store::new(Database::connect(options).await.unwrap());
    store.migrate().await.unwrap();
    store
}
