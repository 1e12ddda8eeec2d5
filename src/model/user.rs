use crate::model::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = "3f2a9c0d8e7b4a1f9c2d3e4f5a6b7c8d")]
    pub id: String,

    #[schema(example = "Vendor User")]
    pub name: String,

    #[schema(example = "vendor@example.com")]
    pub email: String,

    /// argon2 PHC string, never serialized
    #[serde(skip_serializing, default)]
    pub password: String,

    pub role: Role,

    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}
