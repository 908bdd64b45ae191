//! Dashboard summary plus session and language endpoints.
//!
//! The dashboard is derived entirely from the session's Generation Log; it
//! holds no state of its own.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{require_token, session_expired};
use crate::i18n::{self, Lang};
use crate::{AppState, ErrorResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityEntry {
    #[schema(example = "Buat Surat Massal untuk Budi")]
    pub aktivitas: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub username: String,
    pub total_letters: usize,
    pub letters_success: usize,
    pub letters_failed: usize,
    pub templates_available: usize,
    pub last_data_rows: usize,
    /// Up to five most recent log entries, newest first.
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionInfo {
    pub username: String,
    pub lang: Lang,
    pub has_template: bool,
    pub has_table: bool,
    pub rows_loaded: usize,
    pub log_entries: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LangRequest {
    pub lang: Lang,
}

/// Dashboard statistics for the logged-in session
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Run totals and recent activity", body = DashboardSummary),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn dashboard(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };

    let summary = state.sessions.with_session(token, |session| {
        let total = session.generate_log.len();
        let success = session
            .generate_log
            .iter()
            .filter(|entry| entry.is_success())
            .count();

        let page_title = i18n::t("generate_title", session.lang);
        let recent_activity = session
            .generate_log
            .iter()
            .rev()
            .take(5)
            .map(|entry| ActivityEntry {
                aktivitas: format!("{page_title} untuk {}", entry.nama),
                status: entry.status.clone(),
            })
            .collect();

        DashboardSummary {
            username: session.username.clone(),
            total_letters: total,
            letters_success: success,
            letters_failed: total - success,
            templates_available: usize::from(session.template.is_some()),
            last_data_rows: session.last_data_rows,
            recent_activity,
        }
    });

    match summary {
        Some(summary) => HttpResponse::Ok().json(summary),
        None => session_expired(),
    }
}

/// Current session state
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session fields", body = SessionInfo),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn session_info(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };

    let info = state.sessions.with_session(token, |session| SessionInfo {
        username: session.username.clone(),
        lang: session.lang,
        has_template: session.template.is_some(),
        has_table: session.table.is_some(),
        rows_loaded: session.last_data_rows,
        log_entries: session.generate_log.len(),
    });

    match info {
        Some(info) => HttpResponse::Ok().json(info),
        None => session_expired(),
    }
}

/// Switch the UI language
#[utoipa::path(
    put,
    path = "/api/session/lang",
    tag = "Session",
    security(("bearer_auth" = [])),
    request_body = LangRequest,
    responses(
        (status = 200, description = "Language switched"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn set_lang(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LangRequest>,
) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state
        .sessions
        .with_session(token, |session| session.lang = body.lang)
    {
        Some(()) => HttpResponse::Ok().json(serde_json::json!({ "lang": body.lang })),
        None => session_expired(),
    }
}

/// Reset the session workspace
#[utoipa::path(
    post,
    path = "/api/session/reset",
    tag = "Session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Uploads, log and archive dropped; login and language kept"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn reset(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state
        .sessions
        .with_session(token, |session| session.reset_workspace())
    {
        Some(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "workspace reset" })),
        None => session_expired(),
    }
}

/// UI string table for one language
#[utoipa::path(
    get,
    path = "/api/i18n/{lang}",
    tag = "Session",
    params(("lang" = String, Path, description = "Language code: id or en")),
    responses(
        (status = 200, description = "Key to string map"),
        (status = 400, description = "Unknown language code")
    )
)]
pub async fn i18n_table(path: web::Path<String>) -> impl Responder {
    let lang = match path.as_str() {
        "id" => Lang::Id,
        "en" => Lang::En,
        other => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                "unknown language code '{other}'"
            )))
        }
    };
    HttpResponse::Ok().json(i18n::table(lang))
}

/// Configure dashboard, session and i18n routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(dashboard))
        .service(
            web::scope("/session")
                .route("", web::get().to(session_info))
                .route("/lang", web::put().to(set_lang))
                .route("/reset", web::post().to(reset)),
        )
        .route("/i18n/{lang}", web::get().to(i18n_table));
}
