//! Domain entities mirrored from persistent storage.
//!
//! Field names serialize in camelCase because the JSON payloads are consumed
//! by browser clients that expect that convention.

use serde::Serialize;
use time::Date;

/// A waste category, such as "Plastic" or "Glass".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteTypeRecord {
    pub id: i64,
    pub name: String,
}

/// A waste item together with its category, the projection the API serves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteItemWithType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub waste_type_id: i64,
    pub waste_type: WasteTypeRecord,
}

/// A staffed or unstaffed collection point for special waste.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropboxRecord {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A scheduled curbside pickup for one district.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRecord {
    pub id: i64,
    pub district: String,
    pub scheduled_on: Date,
    pub note: Option<String>,
}
