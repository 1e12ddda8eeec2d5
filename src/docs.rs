use crate::api::asset::{AssignAsset, CreateAsset};
use crate::api::document::UploadDocumentForm;
use crate::api::profile::ProfileResponse;
use crate::api::vendor::{CreateVendor, UpdateVendor, VendorDetail};
use crate::model::{
    asset::{Asset, AssetStatus},
    attendance::Attendance,
    document::{Document, DocumentType},
    role::Role,
    user::User,
    vendor::{Vendor, VendorStatus},
};
use crate::models::{AuthResponse, LoginReqDto, SignupReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vendor Management System API",
        version = "1.0.0",
        description = r#"
## Vendor Management System (VMS)

Backend for tracking external contractors ("vendors"), the company assets
lent to them, their documents, and their attendance.

### 🔹 Key Features
- **Vendor Management**
  - Create, update, list and view vendor profiles
- **Asset Management**
  - Register assets, assign them to vendors and take them back
- **Document Management**
  - Upload (multipart form), download and delete vendor documents
- **Attendance**
  - Synthetic attendance refreshed daily, filterable by date range

### 🔐 Security
Every endpoint except `/auth/*` requires a **JWT Bearer** access token.
`/admin/*` endpoints additionally require the **admin** role.

### 📦 Response Format
- JSON bodies with camelCase fields
- Errors as `{"error": "..."}`
"#,
    ),
    paths(
        crate::auth::handlers::signup,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::profile::get_profile,
        crate::api::profile::my_attendance,
        crate::api::profile::my_assets,
        crate::api::profile::my_documents,

        crate::api::vendor::create_vendor,
        crate::api::vendor::list_vendors,
        crate::api::vendor::get_vendor,
        crate::api::vendor::update_vendor,

        crate::api::asset::create_asset,
        crate::api::asset::list_assets,
        crate::api::asset::update_asset,
        crate::api::asset::assign_asset,
        crate::api::asset::return_asset,

        crate::api::document::upload_document,
        crate::api::document::list_documents,
        crate::api::document::get_document,
        crate::api::document::delete_document,

        crate::api::attendance::list_attendance,
        crate::api::attendance::get_vendor_attendance,
        crate::api::attendance::sync_attendance
    ),
    components(
        schemas(
            SignupReq,
            LoginReqDto,
            AuthResponse,
            User,
            Role,
            ProfileResponse,
            Vendor,
            VendorStatus,
            CreateVendor,
            UpdateVendor,
            VendorDetail,
            Asset,
            AssetStatus,
            CreateAsset,
            AssignAsset,
            Document,
            DocumentType,
            UploadDocumentForm,
            Attendance
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup, login and token APIs"),
        (name = "Profile", description = "Self-service APIs for the signed-in user"),
        (name = "Vendor", description = "Vendor management APIs"),
        (name = "Asset", description = "Asset management APIs"),
        (name = "Document", description = "Vendor document APIs"),
        (name = "Attendance", description = "Attendance APIs"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the protected paths.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
