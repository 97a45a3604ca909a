use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::Claims;
use tracing::warn;

use crate::errors::ApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Serialize)]
pub struct TokenOutput {
    pub token: String,
}

#[derive(Deserialize)]
pub struct CheckEmailQuery {
    pub email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailOutput {
    pub is_free: bool,
}

/// Identity resolved by [`require_auth`], available to handlers as an extension.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub is_admin: bool,
    pub claims: Claims,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/api/user/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered", body = crate::openapi::TokenResponse), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse)))]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<TokenOutput>), ApiError> {
    let session = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(TokenOutput { token: session.token })))
}

#[utoipa::path(post, path = "/api/user/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In", body = crate::openapi::TokenResponse), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<TokenOutput>), ApiError> {
    let session = state.auth.login(input).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((jar, Json(TokenOutput { token: session.token })))
}

#[utoipa::path(post, path = "/api/user/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/user/check-email", tag = "auth", params(("email" = String, Query, description = "Address to check")), responses((status = 200, description = "Availability", body = crate::openapi::CheckEmailResponse), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse)))]
pub async fn check_email(
    State(state): State<AppState>,
    Query(q): Query<CheckEmailQuery>,
) -> Result<Json<CheckEmailOutput>, ApiError> {
    let email = q.email.unwrap_or_default();
    if email.trim().is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }
    let is_free = state.auth.is_email_free(&email).await?;
    Ok(Json(CheckEmailOutput { is_free }))
}

#[utoipa::path(get, path = "/api/user/me", tag = "auth", responses((status = 200, description = "Token claims", body = crate::openapi::ClaimsDoc), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<Claims> {
    Json(user.claims)
}

/// Resolve the caller from `Authorization: Bearer <token>`, falling back to the
/// `auth_token` cookie. Stores a [`CurrentUser`] in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    let header_token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|h| h.trim().to_string());

    let token = match header_token {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                warn!(%path, "invalid Authorization format (expect Bearer)");
                return Err(ApiError::unauthorized("Missing authentication token"));
            }
        },
        None => match jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) {
            Some(t) if !t.is_empty() => t,
            _ => {
                warn!(%path, "missing Authorization header and auth_token cookie");
                return Err(ApiError::unauthorized("Missing authentication token"));
            }
        },
    };

    let claims = state.auth.verify_token(&token).map_err(|e| {
        warn!(%path, err = %e, "token validation failed");
        ApiError::unauthorized("Invalid or expired token")
    })?;
    let id = claims
        .user_id()
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
    req.extensions_mut().insert(CurrentUser { id, is_admin: claims.is_admin, claims });
    Ok(next.run(req).await)
}

/// Layered inside [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin => Ok(next.run(req).await),
        Some(_) => Err(ApiError::forbidden("Admin only")),
        None => Err(ApiError::unauthorized("Missing authentication token")),
    }
}

/// Admins manage vacations but never follow them.
pub async fn require_non_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<CurrentUser>() {
        Some(user) if !user.is_admin => Ok(next.run(req).await),
        Some(_) => Err(ApiError::forbidden("Admins cannot follow vacations")),
        None => Err(ApiError::unauthorized("Missing authentication token")),
    }
}
