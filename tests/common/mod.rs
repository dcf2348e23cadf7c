#![allow(dead_code)]

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use noemovibe_server::sea_orm::{ConnectOptions, Database};
use noemovibe_server::store::NewDiaryEntry;
use noemovibe_server::Store;

/// A migrated store backed by a private in-memory SQLite database.
pub async fn setup_store() -> Store {
    // One pooled connection: every new SQLite connection would open its own
    // empty in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    let store = Store::new(db);
    store.migrate().await.expect("run migrations");
    store
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn new_entry(entry_uuid: &str, entry_date: NaiveDateTime) -> NewDiaryEntry {
    NewDiaryEntry {
        entry_uuid: entry_uuid.to_string(),
        entry_date,
        mood_score: 3,
        mood_percentage: 60,
        activities: vec!["walk".to_string()],
        notes: "steady day".to_string(),
    }
}
