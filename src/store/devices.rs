use sea_orm::{ActiveModelTrait, DatabaseTransaction, DbErr, Set};

use super::{find_user, settle, Store};
use crate::entities::user;
use crate::error::{is_unique_violation, Error};

const MAX_DEVICE_ID_LEN: usize = 255;

/// Outcome of a device registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: user::Model,
    /// `false` when the device was already known.
    pub created: bool,
}

impl Registration {
    pub fn message(&self) -> &'static str {
        if self.created {
            "Device registered successfully"
        } else {
            "Device already exists"
        }
    }
}

impl Store {
    /// Registers `device_id`, or returns the existing user when it is already
    /// known. Safe to retry.
    pub async fn register_device(&self, device_id: &str) -> Result<Registration, Error> {
        validate_device_id(device_id)?;
        self.register(device_id)
            .await
            .map_err(|e| e.with_context("Registration failed"))
    }

    async fn register(&self, device_id: &str) -> Result<Registration, Error> {
        let txn = self.begin().await?;
        let result = register_in(&txn, device_id).await;
        let outcome = settle(txn, result).await;
        self.recover_lost_race(device_id, outcome).await
    }

    /// A conflict here means a concurrent registration committed the same
    /// device first; the caller gets that row reported as already existing.
    async fn recover_lost_race(
        &self,
        device_id: &str,
        outcome: Result<Registration, Error>,
    ) -> Result<Registration, Error> {
        match outcome {
            Err(Error::Conflict(_)) => {
                tracing::info!(device_id, "device registered concurrently, reusing existing row");
                match find_user(&self.db, device_id).await? {
                    Some(user) => Ok(Registration {
                        user,
                        created: false,
                    }),
                    None => Err(DbErr::RecordNotFound(format!(
                        "device {device_id} vanished after a unique violation"
                    ))
                    .into()),
                }
            }
            other => other,
        }
    }
}

async fn register_in(txn: &DatabaseTransaction, device_id: &str) -> Result<Registration, Error> {
    if let Some(user) = find_user(txn, device_id).await? {
        return Ok(Registration {
            user,
            created: false,
        });
    }

    insert_user(txn, device_id).await.map(|user| Registration {
        user,
        created: true,
    })
}

/// Inserts the user row, reporting a unique-key rejection as a conflict.
async fn insert_user(txn: &DatabaseTransaction, device_id: &str) -> Result<user::Model, Error> {
    let now = chrono::Utc::now().naive_utc();
    let new_user = user::ActiveModel {
        device_id: Set(device_id.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_user.insert(txn).await {
        Ok(user) => Ok(user),
        Err(e) if is_unique_violation(&e) => Err(Error::conflict("Device already exists")),
        Err(e) => Err(e.into()),
    }
}

fn validate_device_id(device_id: &str) -> Result<(), Error> {
    if device_id.trim().is_empty() {
        return Err(Error::invalid("device_id must not be empty"));
    }
    if device_id.chars().count() > MAX_DEVICE_ID_LEN {
        return Err(Error::invalid(format!(
            "device_id must be at most {MAX_DEVICE_ID_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::User;
    use crate::store::memory_store;
    use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};

    #[test]
    fn blank_device_ids_are_rejected() {
        assert!(matches!(validate_device_id(""), Err(Error::InvalidRequest(_))));
        assert!(matches!(validate_device_id("   "), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn device_id_length_is_bounded() {
        assert!(validate_device_id(&"d".repeat(255)).is_ok());
        assert!(matches!(
            validate_device_id(&"d".repeat(256)),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn insert_after_a_competing_commit_reports_the_existing_device() {
        let store = memory_store().await;
        let winner = store.register_device("device-race").await.unwrap();

        // Replays the losing writer: its lookup missed, so it goes straight
        // to the insert and hits the unique key.
        let txn = store.connection().begin().await.unwrap();
        let result = insert_user(&txn, "device-race").await.map(|user| Registration {
            user,
            created: true,
        });
        assert!(matches!(result, Err(Error::Conflict(_))));
        let outcome = settle(txn, result).await;

        let registration = store
            .recover_lost_race("device-race", outcome)
            .await
            .unwrap();

        assert!(!registration.created);
        assert_eq!(registration.message(), "Device already exists");
        assert_eq!(registration.user.user_id, winner.user.user_id);
        let users = User::find().count(store.connection()).await.unwrap();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn conflict_without_a_stored_row_is_a_storage_failure() {
        let store = memory_store().await;

        let err = store
            .recover_lost_race("device-gone", Err(Error::conflict("Device already exists")))
            .await
            .unwrap_err()
            .with_context("Registration failed");

        assert!(matches!(
            err,
            Error::StorageFailure {
                context: "Registration failed",
                source: DbErr::RecordNotFound(_),
            }
        ));
    }
}
