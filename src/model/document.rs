use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentType {
    JoiningLetter,
    Agreement,
    IdProof,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub vendor_id: String,

    /// Original file name as uploaded
    #[schema(example = "agreement.pdf")]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: DocumentType,

    #[schema(example = "uploads/3f2a..._9c1e....pdf")]
    pub file_path: String,

    #[schema(value_type = String, format = DateTime)]
    pub uploaded_at: DateTime<Utc>,
}
