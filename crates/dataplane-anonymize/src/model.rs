use serde::{Deserialize, Serialize};

/// A single building with its owner and consumption history.
///
/// Absent fields decode to their defaults and `None` values are omitted
/// when the record is written back out. The anonymizer only uses it to
/// check a payload's shape; it never re-serializes through this type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub living_space: f32,
    pub meter_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmth_total: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warm_water_total: Option<Vec<f32>>,
    pub heated_basement: bool,
    pub apartments: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_trustee: Option<String>,
}
