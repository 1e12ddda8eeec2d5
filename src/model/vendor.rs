use crate::model::{asset::Asset, document::Document};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VendorStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "3f2a9c0d8e7b4a1f9c2d3e4f5a6b7c8d",
        "userId": null,
        "companyName": "Acme Contractors",
        "joiningDate": "2024-01-01",
        "endDate": null,
        "department": "IT",
        "projectName": "Migration",
        "status": "active",
        "documents": [],
        "assets": []
    })
)]
pub struct Vendor {
    pub id: String,

    /// Login account bound to this vendor profile
    pub user_id: Option<String>,

    #[schema(example = "Acme Contractors")]
    pub company_name: String,

    #[schema(example = "2024-01-01", value_type = String, format = Date)]
    pub joining_date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,

    #[schema(example = "IT")]
    pub department: String,

    #[schema(example = "Migration")]
    pub project_name: String,

    pub status: VendorStatus,

    /// Snapshot copies taken at upload time
    pub documents: Vec<Document>,

    /// Snapshot copies taken at assignment time
    pub assets: Vec<Asset>,
}
