use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::{asset::Asset, attendance::Attendance, document::Document, user::User, vendor::Vendor},
    store::{AttendanceLedger, Store},
};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
}

/// Current user with the linked vendor profile, if any
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "Profile",
    security(
        ("bearer_auth" = [])
    )
)]
#[instrument(name = "profile", skip_all, fields(user_id = %auth.user_id, email = %auth.email))]
pub async fn get_profile(
    auth: AuthUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, ApiError> {
    let user = store
        .get_user(&auth.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    debug!("Profile loaded");

    Ok(HttpResponse::Ok().json(ProfileResponse {
        vendor: store.vendor_for_user(&user.id),
        user,
    }))
}

/// My attendance records
#[utoipa::path(
    get,
    path = "/api/my-attendance",
    responses(
        (status = 200, description = "Attendance of the caller's vendor profile", body = [Attendance]),
        (status = 403, description = "Caller is not a vendor")
    ),
    tag = "Profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_attendance(
    auth: AuthUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, ApiError> {
    auth.require_vendor("attendance")?;

    let records: Vec<Attendance> = store
        .vendor_for_user(&auth.user_id)
        .map(|v| store.attendance_for(&v.id))
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(records))
}

/// My assigned assets
#[utoipa::path(
    get,
    path = "/api/my-assets",
    responses(
        (status = 200, description = "Assets assigned to the caller", body = [Asset]),
        (status = 403, description = "Caller is not a vendor")
    ),
    tag = "Profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_assets(auth: AuthUser, store: web::Data<Store>) -> Result<HttpResponse, ApiError> {
    auth.require_vendor("assets")?;

    let assets: Vec<Asset> = store
        .vendor_for_user(&auth.user_id)
        .map(|v| store.assets_assigned_to(&v.id))
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(assets))
}

/// My documents
#[utoipa::path(
    get,
    path = "/api/my-documents",
    responses(
        (status = 200, description = "Documents of the caller's vendor profile", body = [Document]),
        (status = 403, description = "Caller is not a vendor")
    ),
    tag = "Profile",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_documents(
    auth: AuthUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, ApiError> {
    auth.require_vendor("documents")?;

    let documents: Vec<Document> = store
        .vendor_for_user(&auth.user_id)
        .map(|v| v.documents)
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(documents))
}
