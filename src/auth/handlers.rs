use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
        sessions::SessionStore,
    },
    config::Config,
    error::ApiError,
    model::{role::Role, user::User},
    models::{AuthResponse, LoginReqDto, SignupReq, TokenType},
    store::Store,
    utils::id::generate_id,
};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// Issues an access/refresh pair and registers the refresh session.
async fn issue_tokens(
    user: &User,
    config: &Config,
    sessions: &SessionStore,
) -> Result<(String, String), ApiError> {
    let access_token = generate_access_token(user, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| ApiError::internal(format!("access token: {e}")))?;

    let (refresh_token, refresh_claims) =
        generate_refresh_token(user, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(|e| ApiError::internal(format!("refresh token: {e}")))?;

    debug!(user_id = %user.id, jti = %refresh_claims.jti, "Storing refresh session");
    sessions.open(&refresh_claims.jti, &user.id).await;

    Ok((access_token, refresh_token))
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Create the default admin account unless one already exists.
pub fn seed_admin(store: &Store, config: &Config) -> anyhow::Result<()> {
    if store.has_admin() {
        return Ok(());
    }

    let hashed = hash_password(&config.admin_password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    store
        .insert_user(User {
            id: generate_id(),
            name: "Admin".into(),
            email: config.admin_email.clone(),
            password: hashed,
            role: Role::Admin,
            created_at: Utc::now(),
        })
        .map_err(|e| anyhow::anyhow!("Failed to seed admin: {e}"))?;

    info!(email = %config.admin_email, "Default admin account created");
    Ok(())
}

/// Register a vendor account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupReq,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields", body = Object, example = json!({
            "error": "Name, email and password are required"
        })),
        (status = 403, description = "Admin self-registration"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_signup", skip(store, config, sessions, payload), fields(email = %payload.email))]
pub async fn signup(
    payload: web::Json<SignupReq>,
    store: web::Data<Store>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty field");
        return Err(ApiError::bad_request(
            "Name, email and password are required",
        ));
    }

    let role = payload.role.unwrap_or_default();
    if role == Role::Admin {
        return Err(ApiError::forbidden("Admin accounts cannot be self-registered"));
    }

    let hashed = hash_password(&payload.password)
        .map_err(|e| ApiError::internal(format!("hash password: {e}")))?;

    let user = store.insert_user(User {
        id: generate_id(),
        name: name.to_string(),
        email: email.to_string(),
        password: hashed,
        role,
        created_at: Utc::now(),
    })?;

    let (token, refresh_token) = issue_tokens(&user, &config, &sessions).await?;

    info!(user_id = %user.id, "Signup successful");

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        refresh_token,
        user,
    }))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "Invalid credentials"
        }))
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(store, config, sessions, user), fields(email = %user.email))]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<Store>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let account = match store.find_user_by_email(user.email.trim()) {
        Some(account) => {
            debug!(user_id = %account.id, "User found");
            account
        }
        None => {
            info!("Invalid credentials: user not found");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    if let Err(e) = verify_password(&user.password, &account.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let (token, refresh_token) = issue_tokens(&account, &config, &sessions).await?;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        refresh_token,
        user: account,
    }))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = Object, example = json!({
            "token": "eyJ...",
            "refreshToken": "eyJ..."
        })),
        (status = 401, description = "Missing, invalid, or already used refresh token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ApiError> {
    let token = bearer(&req).ok_or_else(|| ApiError::unauthorized("No token"))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::unauthorized("Refresh token required"));
    }

    // rotation: the old session is gone whatever happens next
    let owner = sessions
        .consume(&claims.jti)
        .await
        .ok_or_else(|| ApiError::unauthorized("Refresh token revoked"))?;

    let user = match store.get_user(&owner) {
        Some(user) if user.id == claims.sub => user,
        _ => {
            error!(jti = %claims.jti, "Refresh session does not match a user");
            return Err(ApiError::unauthorized("Invalid token"));
        }
    };

    let (token, refresh_token) = issue_tokens(&user, &config, &sessions).await?;

    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "refreshToken": refresh_token
    })))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Logged out (also returned for unknown tokens)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
) -> HttpResponse {
    let Some(token) = bearer(&req) else {
        return HttpResponse::NoContent().finish();
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens map to a session
    if claims.token_type == TokenType::Refresh {
        sessions.revoke(&claims.jti).await;
    }

    HttpResponse::NoContent().finish()
}
