use crate::{
    error::ApiError,
    model::{
        asset::Asset,
        attendance::Attendance,
        vendor::{Vendor, VendorStatus},
    },
    store::{AttendanceLedger, Store, VendorChanges},
    utils::{
        dates::{parse_date, parse_optional_date},
        id::generate_id,
    },
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendor {
    #[schema(example = "Acme Contractors")]
    pub company_name: String,
    #[schema(example = "2024-01-01", format = Date)]
    pub joining_date: String,
    #[schema(example = "2024-12-31", format = Date)]
    pub end_date: Option<String>,
    #[schema(example = "IT")]
    pub department: String,
    #[schema(example = "Migration")]
    pub project_name: String,
    /// Vendor-role account to bind to this profile
    pub user_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendor {
    pub company_name: String,
    #[schema(example = "2024-01-01", format = Date)]
    pub joining_date: String,
    #[schema(format = Date)]
    pub end_date: Option<String>,
    pub department: String,
    pub project_name: String,
    pub status: Option<VendorStatus>,
    pub user_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct VendorDetail {
    pub vendor: Vendor,
    /// Live asset records assigned to the vendor
    pub assets: Vec<Asset>,
    pub attendance: Vec<Attendance>,
}

fn require_text(value: &str, field: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create Vendor
#[utoipa::path(
    post,
    path = "/api/admin/vendors",
    request_body = CreateVendor,
    responses(
        (status = 201, description = "Vendor created", body = Vendor),
        (status = 400, description = "Missing field or bad date", body = Object, example = json!({
            "error": "Invalid joining date format, expected YYYY-MM-DD"
        })),
        (status = 404, description = "Linked user not found"),
        (status = 409, description = "User already linked to another vendor")
    ),
    tag = "Vendor",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_vendor(
    store: web::Data<Store>,
    payload: web::Json<CreateVendor>,
) -> Result<HttpResponse, ApiError> {
    let vendor = Vendor {
        id: generate_id(),
        user_id: non_blank(payload.user_id.as_ref()),
        company_name: require_text(&payload.company_name, "companyName")?,
        joining_date: parse_date(&payload.joining_date, "joining date")?,
        end_date: parse_optional_date(payload.end_date.as_deref(), "end date")?,
        department: require_text(&payload.department, "department")?,
        project_name: require_text(&payload.project_name, "projectName")?,
        status: VendorStatus::Active,
        documents: Vec::new(),
        assets: Vec::new(),
    };

    let vendor = store.insert_vendor(vendor)?;
    info!(vendor_id = %vendor.id, company = %vendor.company_name, "Vendor created");

    Ok(HttpResponse::Created().json(vendor))
}

/// List Vendors
#[utoipa::path(
    get,
    path = "/api/admin/vendors",
    responses(
        (status = 200, description = "All vendors", body = [Vendor])
    ),
    tag = "Vendor",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_vendors(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(store.list_vendors())
}

/// Get Vendor with assets and attendance
#[utoipa::path(
    get,
    path = "/api/admin/vendors/{vendor_id}",
    params(
        ("vendor_id", Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Vendor found", body = VendorDetail),
        (status = 404, description = "Vendor not found", body = Object, example = json!({
            "error": "Vendor not found"
        }))
    ),
    tag = "Vendor",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_vendor(
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let vendor_id = path.into_inner();

    let vendor = store
        .get_vendor(&vendor_id)
        .ok_or_else(|| ApiError::not_found("Vendor not found"))?;

    Ok(HttpResponse::Ok().json(VendorDetail {
        assets: store.assets_assigned_to(&vendor_id),
        attendance: store.attendance_for(&vendor_id),
        vendor,
    }))
}

/// Update Vendor
#[utoipa::path(
    put,
    path = "/api/admin/vendors/{vendor_id}",
    params(
        ("vendor_id", Path, description = "Vendor ID")
    ),
    request_body = UpdateVendor,
    responses(
        (status = 200, description = "Vendor updated", body = Vendor),
        (status = 400, description = "Missing field or bad date"),
        (status = 404, description = "Vendor not found")
    ),
    tag = "Vendor",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_vendor(
    store: web::Data<Store>,
    path: web::Path<String>,
    payload: web::Json<UpdateVendor>,
) -> Result<HttpResponse, ApiError> {
    let vendor_id = path.into_inner();

    if !store.vendor_exists(&vendor_id) {
        return Err(ApiError::not_found("Vendor not found"));
    }

    let changes = VendorChanges {
        company_name: require_text(&payload.company_name, "companyName")?,
        joining_date: parse_date(&payload.joining_date, "joining date")?,
        end_date: parse_optional_date(payload.end_date.as_deref(), "end date")?,
        department: require_text(&payload.department, "department")?,
        project_name: require_text(&payload.project_name, "projectName")?,
        status: payload.status,
        user_id: non_blank(payload.user_id.as_ref()),
    };

    let vendor = store.update_vendor(&vendor_id, changes)?;
    info!(vendor_id = %vendor.id, status = %vendor.status, "Vendor updated");

    Ok(HttpResponse::Ok().json(vendor))
}
