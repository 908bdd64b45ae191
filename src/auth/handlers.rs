use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;

use super::model::{LoginRequest, LoginResponse};
use crate::{AppState, ErrorResponse};

/// Extract the session token from an `Authorization: Bearer <uuid>` header.
pub fn session_token(req: &HttpRequest) -> Option<Uuid> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

/// Token extraction for handlers; a missing or malformed header becomes the
/// 401 response directly.
pub fn require_token(req: &HttpRequest) -> Result<Uuid, HttpResponse> {
    session_token(req).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ErrorResponse::new(
            "Unauthorized",
            "Missing or invalid session token",
        ))
    })
}

/// Standard 401 for tokens that no longer map to a live session.
pub fn session_expired() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(
        "Unauthorized",
        "Session expired. Please login again.",
    ))
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    if !state.verifier.verify(&body.username, &body.password) {
        log::warn!("failed login attempt for {:?}", body.username);
        return HttpResponse::Unauthorized().json(ErrorResponse::new(
            "Unauthorized",
            "Invalid username or password",
        ));
    }

    let token = state.sessions.create(&body.username);
    log::info!("user {:?} logged in", body.username);
    HttpResponse::Ok().json(LoginResponse {
        token,
        username: body.username.clone(),
    })
}

/// Logout endpoint; drops the session behind the bearer token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };

    if state.sessions.remove(token) {
        HttpResponse::Ok().json(serde_json::json!({ "message": "logged out" }))
    } else {
        session_expired()
    }
}

/// Configure auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout)),
    );
}
