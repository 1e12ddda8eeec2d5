use crate::{
    api::{asset, attendance, document, profile, vendor},
    auth::{
        handlers,
        middleware::{admin_middleware, auth_middleware},
    },
    config::Config,
    error::ApiError,
};
use actix_cors::Cors;
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    error::JsonPayloadError,
    http::header,
    middleware::from_fn,
    web::{self, JsonConfig, QueryConfig},
};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst are clamped to non-zero");
    Governor::new(&cfg)
}

/// Browser access policy: GET/POST/PUT/DELETE with credentials, preflight cached 12h.
pub fn build_cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(12 * 60 * 60);

    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        config
            .cors_allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

// Extractor failures render through ApiError like every other error
fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        let api_err = match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                ApiError::payload_too_large(err.to_string())
            }
            err => ApiError::bad_request(err.to_string()),
        };
        api_err.into()
    })
}

fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|err, _req| ApiError::bad_request(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.app_data(json_config()).app_data(query_config());

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let signup_limiter = Arc::new(build_limiter(config.rate_signup_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            // Public routes
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/signup")
                            .wrap(signup_limiter.clone())
                            .route(web::post().to(handlers::signup)),
                    )
                    .service(
                        web::resource("/login")
                            .wrap(login_limiter.clone())
                            .route(web::post().to(handlers::login)),
                    )
                    .service(
                        web::resource("/refresh")
                            .wrap(refresh_limiter.clone())
                            .route(web::post().to(handlers::refresh_token)),
                    )
                    .service(
                        web::resource("/logout")
                            .wrap(login_limiter.clone())
                            .route(web::post().to(handlers::logout)),
                    ),
            )
            // Protected routes
            .service(
                web::scope("")
                    .wrap(from_fn(auth_middleware)) // authentication
                    .wrap(protected_limiter) // rate limiting
                    .route("/profile", web::get().to(profile::get_profile))
                    .route("/my-attendance", web::get().to(profile::my_attendance))
                    .route("/my-assets", web::get().to(profile::my_assets))
                    .route("/my-documents", web::get().to(profile::my_documents))
                    .service(
                        web::scope("/admin")
                            .wrap(from_fn(admin_middleware))
                            .service(
                                web::scope("/vendors")
                                    // /admin/vendors
                                    .service(
                                        web::resource("")
                                            .route(web::post().to(vendor::create_vendor))
                                            .route(web::get().to(vendor::list_vendors)),
                                    )
                                    // /admin/vendors/{id}
                                    .service(
                                        web::resource("/{id}")
                                            .route(web::get().to(vendor::get_vendor))
                                            .route(web::put().to(vendor::update_vendor)),
                                    ),
                            )
                            .service(
                                web::scope("/assets")
                                    .service(
                                        web::resource("")
                                            .route(web::post().to(asset::create_asset))
                                            .route(web::get().to(asset::list_assets)),
                                    )
                                    .service(
                                        web::resource("/{id}")
                                            .route(web::put().to(asset::update_asset)),
                                    )
                                    .service(
                                        web::resource("/{id}/assign")
                                            .route(web::post().to(asset::assign_asset)),
                                    )
                                    .service(
                                        web::resource("/{id}/return")
                                            .route(web::post().to(asset::return_asset)),
                                    ),
                            )
                            .service(
                                web::scope("/documents")
                                    .service(
                                        web::resource("")
                                            .route(web::post().to(document::upload_document))
                                            .route(web::get().to(document::list_documents)),
                                    )
                                    .service(
                                        web::resource("/{id}")
                                            .route(web::get().to(document::get_document))
                                            .route(web::delete().to(document::delete_document)),
                                    ),
                            )
                            .service(
                                web::scope("/attendance")
                                    .service(
                                        web::resource("")
                                            .route(web::get().to(attendance::list_attendance)),
                                    )
                                    // before /{vendor_id} so "sync" is never taken as an id
                                    .service(
                                        web::resource("/sync")
                                            .route(web::post().to(attendance::sync_attendance)),
                                    )
                                    .service(
                                        web::resource("/{vendor_id}")
                                            .route(web::get().to(attendance::get_vendor_attendance)),
                                    ),
                            ),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access token (15 min)
//  └─ refresh token (7 days, one moka session per token)

// API REQUEST
//  └─ Authorization: Bearer access token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh token
//       └─ returns a new pair, old refresh session is consumed
