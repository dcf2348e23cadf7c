use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Json, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use super::response::ApiResponse;
use crate::entities::diary_entry;
use crate::error::Error;
use crate::store::{DiaryEntryPatch, NewDiaryEntry, Store};

#[derive(Deserialize)]
pub struct DeviceQuery {
    pub device_id: String,
}

#[derive(Deserialize)]
pub struct CreateDiaryEntryRequest {
    pub device_id: String,
    pub entry_uuid: String,
    #[serde(deserialize_with = "deserialize_entry_date")]
    pub entry_date: NaiveDateTime,
    pub mood_score: i32,
    pub mood_percentage: i32,
    pub activities: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Body of a partial update. Fields left out, or sent as `null`, keep their
/// stored value. Anything outside this list is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDiaryEntryRequest {
    #[serde(default, deserialize_with = "deserialize_optional_entry_date")]
    pub entry_date: Option<NaiveDateTime>,
    pub mood_score: Option<i32>,
    pub mood_percentage: Option<i32>,
    pub activities: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl From<UpdateDiaryEntryRequest> for DiaryEntryPatch {
    fn from(request: UpdateDiaryEntryRequest) -> Self {
        Self {
            entry_date: request.entry_date,
            mood_score: request.mood_score,
            mood_percentage: request.mood_percentage,
            activities: request.activities,
            notes: request.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryRef {
    pub entry_id: i32,
    pub entry_uuid: String,
}

impl From<diary_entry::Model> for EntryRef {
    fn from(model: diary_entry::Model) -> Self {
        Self {
            entry_id: model.entry_id,
            entry_uuid: model.entry_uuid,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiaryEntryResponse {
    pub entry_id: i32,
    pub entry_uuid: String,
    pub entry_date: NaiveDateTime,
    pub mood_score: i32,
    pub mood_percentage: i32,
    pub activities: Vec<String>,
    pub notes: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<diary_entry::Model> for DiaryEntryResponse {
    fn from(model: diary_entry::Model) -> Self {
        Self {
            entry_id: model.entry_id,
            entry_uuid: model.entry_uuid,
            entry_date: model.entry_date,
            mood_score: model.mood_score,
            mood_percentage: model.mood_percentage,
            activities: model.activities.0,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// POST /api/diary/entries - Upload a new diary entry
pub async fn create_diary_entry(
    Extension(store): Extension<Store>,
    payload: Result<Json<CreateDiaryEntryRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(payload) = payload?;
    tracing::Span::current()
        .record("table", "diary_entries")
        .record("action", "create_diary_entry")
        .record("device_id", payload.device_id.as_str())
        .record("entry_uuid", payload.entry_uuid.as_str());

    let entry = NewDiaryEntry {
        entry_uuid: payload.entry_uuid,
        entry_date: payload.entry_date,
        mood_score: payload.mood_score,
        mood_percentage: payload.mood_percentage,
        activities: payload.activities.unwrap_or_default(),
        notes: payload.notes.unwrap_or_default(),
    };
    let created = store.create_diary_entry(&payload.device_id, entry).await?;

    info!("Created diary entry: {}", created.entry_id);
    crate::metrics::record_entry_created();
    tracing::Span::current()
        .record("user_id", created.user_id)
        .record("business_event", "Diary entry uploaded");

    Ok(ApiResponse::ok("Diary entry uploaded successfully", EntryRef::from(created))
        .with_status(StatusCode::CREATED))
}

// GET /api/diary/entries?device_id=... - All entries of a device, newest first
pub async fn get_diary_entries(
    Extension(store): Extension<Store>,
    query: Result<Query<DeviceQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    tracing::Span::current()
        .record("table", "diary_entries")
        .record("action", "list_diary_entries")
        .record("device_id", query.device_id.as_str());

    let entries = store.list_diary_entries(&query.device_id).await?;
    let response: Vec<DiaryEntryResponse> = entries.into_iter().map(Into::into).collect();

    Ok((StatusCode::OK, Json(response)).into_response())
}

// PUT|PATCH /api/diary/entries/:entry_uuid?device_id=... - Partial update
pub async fn update_diary_entry(
    Extension(store): Extension<Store>,
    Path(entry_uuid): Path<String>,
    query: Result<Query<DeviceQuery>, QueryRejection>,
    payload: Result<Json<UpdateDiaryEntryRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Query(query) = query?;
    let Json(payload) = payload?;
    tracing::Span::current()
        .record("table", "diary_entries")
        .record("action", "update_diary_entry")
        .record("device_id", query.device_id.as_str())
        .record("entry_uuid", entry_uuid.as_str());

    let updated = store
        .update_diary_entry(&query.device_id, &entry_uuid, payload.into())
        .await?;

    info!("Updated diary entry: {}", updated.entry_id);
    crate::metrics::record_entry_updated();
    tracing::Span::current()
        .record("user_id", updated.user_id)
        .record("business_event", "Diary entry updated");

    Ok(ApiResponse::ok("Diary entry updated successfully", EntryRef::from(updated))
        .with_status(StatusCode::OK))
}

/// Accepts RFC 3339 timestamps (converted to UTC), naive ISO-8601 date-times
/// and bare dates (midnight). Naive values are taken as UTC.
pub fn parse_entry_date(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(format!("invalid entry_date {raw:?}: expected an ISO-8601 date-time"))
}

fn deserialize_entry_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_entry_date(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_entry_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_entry_date(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
