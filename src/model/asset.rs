use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssetStatus {
    Assigned,
    Available,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,

    #[schema(example = "ThinkPad T14")]
    pub name: String,

    /// laptop, monitor, keyboard, ...
    #[serde(rename = "type")]
    #[schema(example = "laptop")]
    pub kind: String,

    #[schema(example = "SN-12345")]
    pub serial_number: String,

    /// Vendor id while assigned
    pub assigned_to: Option<String>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub assigned_at: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub returned_at: Option<DateTime<Utc>>,

    pub status: AssetStatus,
}
