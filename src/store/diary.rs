use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use super::{require_user, settle, Store};
use crate::entities::{diary_entry, DiaryEntry};
use crate::error::{is_unique_violation, Error};

const MAX_ENTRY_UUID_LEN: usize = 36;

/// A diary entry as submitted by a client, before it is stored.
#[derive(Debug, Clone)]
pub struct NewDiaryEntry {
    pub entry_uuid: String,
    pub entry_date: NaiveDateTime,
    pub mood_score: i32,
    pub mood_percentage: i32,
    pub activities: Vec<String>,
    pub notes: String,
}

/// Fields a client may change on an existing entry. `None` leaves the stored
/// value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryEntryPatch {
    pub entry_date: Option<NaiveDateTime>,
    pub mood_score: Option<i32>,
    pub mood_percentage: Option<i32>,
    pub activities: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl DiaryEntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every present field onto `entry` and returns the names of the
    /// columns it set.
    pub fn apply(self, entry: &mut diary_entry::ActiveModel) -> Vec<&'static str> {
        let Self {
            entry_date,
            mood_score,
            mood_percentage,
            activities,
            notes,
        } = self;
        let mut changed = Vec::new();

        if let Some(entry_date) = entry_date {
            entry.entry_date = Set(entry_date);
            changed.push("entry_date");
        }
        if let Some(mood_score) = mood_score {
            entry.mood_score = Set(mood_score);
            changed.push("mood_score");
        }
        if let Some(mood_percentage) = mood_percentage {
            entry.mood_percentage = Set(mood_percentage);
            changed.push("mood_percentage");
        }
        if let Some(activities) = activities {
            entry.activities = Set(activities.into());
            changed.push("activities");
        }
        if let Some(notes) = notes {
            entry.notes = Set(notes);
            changed.push("notes");
        }

        changed
    }
}

impl Store {
    /// Stores a new entry for the device. Rejects a second entry with the
    /// same uuid for the same device.
    pub async fn create_diary_entry(
        &self,
        device_id: &str,
        entry: NewDiaryEntry,
    ) -> Result<diary_entry::Model, Error> {
        const CONTEXT: &str = "Upload failed";
        let txn = self.begin().await.map_err(|e| e.with_context(CONTEXT))?;
        let result = create_in(&txn, device_id, entry).await;
        settle(txn, result).await.map_err(|e| e.with_context(CONTEXT))
    }

    /// All entries of the device, newest `entry_date` first.
    pub async fn list_diary_entries(&self, device_id: &str) -> Result<Vec<diary_entry::Model>, Error> {
        const CONTEXT: &str = "Failed to retrieve diary entries";
        let txn = self.begin().await.map_err(|e| e.with_context(CONTEXT))?;
        let result = list_in(&txn, device_id).await;
        settle(txn, result).await.map_err(|e| e.with_context(CONTEXT))
    }

    /// Merges `patch` into the entry identified by (`device_id`, `entry_uuid`).
    pub async fn update_diary_entry(
        &self,
        device_id: &str,
        entry_uuid: &str,
        patch: DiaryEntryPatch,
    ) -> Result<diary_entry::Model, Error> {
        const CONTEXT: &str = "Update failed";
        let txn = self.begin().await.map_err(|e| e.with_context(CONTEXT))?;
        let result = update_in(&txn, device_id, entry_uuid, patch).await;
        settle(txn, result).await.map_err(|e| e.with_context(CONTEXT))
    }
}

async fn find_entry(
    txn: &DatabaseTransaction,
    user_id: i32,
    entry_uuid: &str,
) -> Result<Option<diary_entry::Model>, Error> {
    Ok(DiaryEntry::find()
        .filter(diary_entry::Column::UserId.eq(user_id))
        .filter(diary_entry::Column::EntryUuid.eq(entry_uuid))
        .one(txn)
        .await?)
}

async fn create_in(
    txn: &DatabaseTransaction,
    device_id: &str,
    entry: NewDiaryEntry,
) -> Result<diary_entry::Model, Error> {
    let user = require_user(txn, device_id).await?;
    validate_entry_uuid(&entry.entry_uuid)?;

    if find_entry(txn, user.user_id, &entry.entry_uuid).await?.is_some() {
        return Err(Error::conflict("Diary entry already exists"));
    }

    insert_entry(txn, user.user_id, entry).await
}

/// Inserts the entry row. A unique-key rejection means a concurrent create
/// with the same uuid committed first and is reported as a conflict.
async fn insert_entry(
    txn: &DatabaseTransaction,
    user_id: i32,
    entry: NewDiaryEntry,
) -> Result<diary_entry::Model, Error> {
    let now = chrono::Utc::now().naive_utc();
    let new_entry = diary_entry::ActiveModel {
        user_id: Set(user_id),
        entry_uuid: Set(entry.entry_uuid),
        entry_date: Set(entry.entry_date),
        mood_score: Set(entry.mood_score),
        mood_percentage: Set(entry.mood_percentage),
        activities: Set(entry.activities.into()),
        notes: Set(entry.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_entry.insert(txn).await {
        Ok(model) => Ok(model),
        Err(e) if is_unique_violation(&e) => Err(Error::conflict("Diary entry already exists")),
        Err(e) => Err(e.into()),
    }
}

async fn list_in(
    txn: &DatabaseTransaction,
    device_id: &str,
) -> Result<Vec<diary_entry::Model>, Error> {
    let user = require_user(txn, device_id).await?;

    Ok(DiaryEntry::find()
        .filter(diary_entry::Column::UserId.eq(user.user_id))
        .order_by_desc(diary_entry::Column::EntryDate)
        .order_by_desc(diary_entry::Column::EntryId)
        .all(txn)
        .await?)
}

async fn update_in(
    txn: &DatabaseTransaction,
    device_id: &str,
    entry_uuid: &str,
    patch: DiaryEntryPatch,
) -> Result<diary_entry::Model, Error> {
    let user = require_user(txn, device_id).await?;
    let entry = find_entry(txn, user.user_id, entry_uuid)
        .await?
        .ok_or_else(|| Error::not_found("Diary entry not found"))?;

    if patch.is_empty() {
        tracing::debug!(entry_uuid, "empty diary entry patch, touching updated_at only");
    }
    let mut active_entry = entry.into_active_model();
    let changed = patch.apply(&mut active_entry);
    active_entry.updated_at = Set(chrono::Utc::now().naive_utc());
    tracing::debug!(entry_uuid, ?changed, "applying diary entry patch");

    Ok(active_entry.update(txn).await?)
}

fn validate_entry_uuid(entry_uuid: &str) -> Result<(), Error> {
    if entry_uuid.trim().is_empty() {
        return Err(Error::invalid("entry_uuid must not be empty"));
    }
    if entry_uuid.chars().count() > MAX_ENTRY_UUID_LEN {
        return Err(Error::invalid(format!(
            "entry_uuid must be at most {MAX_ENTRY_UUID_LEN} characters"
        )));
    }
    Ok(())
}
