use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod analysis;
pub mod auth;
pub mod dashboard;
pub mod docx;
pub mod generate;
pub mod i18n;
pub mod session;
pub mod table;

use crate::auth::{CredentialVerifier, StaticCredentialVerifier};
use crate::session::SessionStore;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// Shared application state: the session store and the credential backend.
pub struct AppState {
    pub sessions: SessionStore,
    pub verifier: Box<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(verifier: Box<dyn CredentialVerifier>) -> Self {
        Self {
            sessions: SessionStore::new(),
            verifier,
        }
    }

    /// Default setup: single static user from `APP_USERNAME`/`APP_PASSWORD`.
    pub fn from_env() -> Self {
        Self::new(Box::new(StaticCredentialVerifier::from_env()))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::generate::handlers::upload_template,
        crate::generate::handlers::upload_data,
        crate::generate::handlers::set_columns,
        crate::generate::handlers::list_names,
        crate::generate::handlers::preview,
        crate::generate::handlers::preview_download,
        crate::generate::handlers::run_generation,
        crate::generate::handlers::progress,
        crate::generate::handlers::log_entries,
        crate::generate::handlers::download_archive,
        crate::analysis::handlers::upload_dataset,
        crate::analysis::handlers::summary,
        crate::analysis::handlers::describe,
        crate::analysis::handlers::histogram,
        crate::analysis::handlers::value_counts,
        crate::dashboard::dashboard,
        crate::dashboard::session_info,
        crate::dashboard::set_lang,
        crate::dashboard::reset,
        crate::dashboard::i18n_table,
    ),
    components(
        schemas(
            auth::model::LoginRequest,
            auth::model::LoginResponse,
            generate::handlers::UploadTemplateResponse,
            generate::handlers::UploadDataResponse,
            generate::handlers::PreviewRequest,
            generate::handlers::PreviewResponse,
            generate::handlers::RunSummary,
            generate::handlers::NamesResponse,
            generate::models::LogEntry,
            generate::models::Progress,
            table::ColumnSelection,
            analysis::handlers::AnalysisUploadResponse,
            analysis::models::ColumnStats,
            analysis::models::Histogram,
            analysis::models::HistogramBin,
            analysis::models::ValueCount,
            analysis::models::ValueCounts,
            analysis::models::MissingSummary,
            analysis::models::TableSummary,
            dashboard::ActivityEntry,
            dashboard::DashboardSummary,
            dashboard::SessionInfo,
            dashboard::LangRequest,
            i18n::Lang,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Authentication", description = "Login and logout."),
        (name = "Session", description = "Session state, language and reset."),
        (name = "Generator", description = "Bulk letter generation pipeline."),
        (name = "Analysis", description = "Ad-hoc dataset analysis."),
        (name = "Dashboard", description = "Run statistics.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost server")
    )
)]
struct ApiDoc;

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_state = web::Data::new(AppState::from_env());

    log::info!("Starting server at http://0.0.0.0:8080");

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(app_state)
            .service(
                web::scope("/api")
                    .configure(auth::handlers::config)
                    .configure(generate::handlers::config)
                    .configure(analysis::handlers::config)
                    .configure(dashboard::config),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
