use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::entities::{DiaryEntry, User};

/// Seeds the total gauges from the current row counts.
pub async fn init_metrics(db: &DatabaseConnection) {
    let user_count = match User::find().count(db).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Failed to count users for metrics: {}", e);
            0
        }
    };
    ::metrics::gauge!("noemovibe_users_total").set(user_count as f64);

    let entry_count = match DiaryEntry::find().count(db).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Failed to count diary entries for metrics: {}", e);
            0
        }
    };
    ::metrics::gauge!("noemovibe_diary_entries_total").set(entry_count as f64);

    tracing::info!(
        "Initialized metrics: Users={}, DiaryEntries={}",
        user_count,
        entry_count
    );
}

pub fn record_device_registered() {
    ::metrics::counter!("noemovibe_devices_registered_total").increment(1);
    ::metrics::gauge!("noemovibe_users_total").increment(1.0);
}

pub fn record_entry_created() {
    ::metrics::counter!("noemovibe_diary_entries_created_total").increment(1);
    ::metrics::gauge!("noemovibe_diary_entries_total").increment(1.0);
}

pub fn record_entry_updated() {
    ::metrics::counter!("noemovibe_diary_entries_updated_total").increment(1);
}
