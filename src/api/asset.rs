use crate::{
    error::ApiError,
    model::asset::{Asset, AssetStatus},
    store::Store,
    utils::id::generate_id,
};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    #[schema(example = "ThinkPad T14")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "laptop")]
    pub kind: String,
    #[schema(example = "SN-12345")]
    pub serial_number: String,
    /// Assign immediately to this vendor
    #[serde(alias = "vendor_id")]
    pub vendor_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignAsset {
    pub vendor_id: String,
}

/// Create Asset
#[utoipa::path(
    post,
    path = "/api/admin/assets",
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 404, description = "Vendor not found")
    ),
    tag = "Asset",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_asset(
    store: web::Data<Store>,
    payload: web::Json<CreateAsset>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    let asset = Asset {
        id: generate_id(),
        name: payload.name,
        kind: payload.kind,
        serial_number: payload.serial_number,
        assigned_to: None,
        assigned_at: None,
        returned_at: None,
        status: AssetStatus::Available,
    };

    let assign_to = payload.vendor_id.as_deref().filter(|v| !v.is_empty());
    let asset = store.insert_asset(asset, assign_to, Utc::now())?;
    info!(asset_id = %asset.id, status = %asset.status, "Asset created");

    Ok(HttpResponse::Created().json(asset))
}

/// List Assets
#[utoipa::path(
    get,
    path = "/api/admin/assets",
    responses(
        (status = 200, description = "All assets", body = [Asset])
    ),
    tag = "Asset",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_assets(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(store.list_assets())
}

/// Update Asset details
#[utoipa::path(
    put,
    path = "/api/admin/assets/{asset_id}",
    params(
        ("asset_id", Path, description = "Asset ID")
    ),
    request_body = CreateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found")
    ),
    tag = "Asset",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_asset(
    store: web::Data<Store>,
    path: web::Path<String>,
    payload: web::Json<CreateAsset>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let asset = store.update_asset(&path, payload.name, payload.kind, payload.serial_number)?;

    Ok(HttpResponse::Ok().json(asset))
}

/// Assign Asset to a vendor
#[utoipa::path(
    post,
    path = "/api/admin/assets/{asset_id}/assign",
    params(
        ("asset_id", Path, description = "Asset ID")
    ),
    request_body = AssignAsset,
    responses(
        (status = 200, description = "Asset assigned", body = Asset),
        (status = 400, description = "Asset is not available", body = Object, example = json!({
            "error": "Asset is not available"
        })),
        (status = 404, description = "Asset or vendor not found")
    ),
    tag = "Asset",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn assign_asset(
    store: web::Data<Store>,
    path: web::Path<String>,
    payload: web::Json<AssignAsset>,
) -> Result<HttpResponse, ApiError> {
    let asset_id = path.into_inner();
    let asset = store.assign_asset(&asset_id, &payload.vendor_id, Utc::now())?;
    info!(asset_id = %asset_id, vendor_id = %payload.vendor_id, "Asset assigned");

    Ok(HttpResponse::Ok().json(asset))
}

/// Return an assigned Asset
#[utoipa::path(
    post,
    path = "/api/admin/assets/{asset_id}/return",
    params(
        ("asset_id", Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset returned", body = Asset),
        (status = 400, description = "Asset is not assigned"),
        (status = 404, description = "Asset not found")
    ),
    tag = "Asset",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn return_asset(
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let asset_id = path.into_inner();
    let asset = store.return_asset(&asset_id, Utc::now())?;
    info!(asset_id = %asset_id, "Asset returned");

    Ok(HttpResponse::Ok().json(asset))
}
