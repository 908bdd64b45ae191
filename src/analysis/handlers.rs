use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{require_token, session_expired};
use crate::generate::handlers::read_multipart_file;
use crate::session::UploadedTable;
use crate::table::DataTable;
use crate::{AppState, ErrorResponse};

use super::models::{ColumnStats, Histogram, TableSummary, ValueCounts};
use super::stats;

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisUploadResponse {
    pub filename: String,
    pub rows: usize,
    pub headers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistogramQuery {
    pub column: String,
    #[serde(default = "default_bins")]
    pub bins: usize,
}

fn default_bins() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct ValueCountsQuery {
    pub column: String,
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_top() -> usize {
    5
}

/// Fetch the cached analysis table or produce the right error response.
fn with_analysis_table<R>(
    req: &HttpRequest,
    state: &web::Data<AppState>,
    f: impl FnOnce(&DataTable) -> R,
) -> Result<R, HttpResponse> {
    let token = require_token(req)?;
    match state
        .sessions
        .with_session(token, |session| session.analysis_table.as_ref().map(|t| f(&t.table)))
    {
        None => Err(session_expired()),
        Some(None) => Err(HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("upload a dataset first"))),
        Some(Some(result)) => Ok(result),
    }
}

/// Upload a dataset for analysis (.xlsx or .csv)
#[utoipa::path(
    post,
    path = "/api/analysis/upload",
    tag = "Analysis",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dataset cached in session", body = AnalysisUploadResponse),
        (status = 400, description = "Unreadable or unsupported table"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn upload_dataset(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };

    let (filename, bytes) = match read_multipart_file(payload).await {
        Ok(upload) => upload,
        Err(message) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
    };

    let table = match DataTable::load(&filename, &bytes) {
        Ok(table) => table,
        Err(err) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        }
    };

    log::info!("analysis dataset {filename:?}: {} rows", table.len());
    let response = AnalysisUploadResponse {
        filename: filename.clone(),
        rows: table.len(),
        headers: table.headers.clone(),
    };
    let stored = state.sessions.with_session(token, move |session| {
        session.analysis_table = Some(UploadedTable { filename, table });
    });
    match stored {
        Some(()) => HttpResponse::Ok().json(response),
        None => session_expired(),
    }
}

/// Table overview
#[utoipa::path(
    get,
    path = "/api/analysis/summary",
    tag = "Analysis",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Row/column/missing overview", body = TableSummary),
        (status = 400, description = "No dataset uploaded"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn summary(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match with_analysis_table(&req, &state, stats::summarize) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(response) => response,
    }
}

/// Descriptive statistics for every numeric column
#[utoipa::path(
    get,
    path = "/api/analysis/describe",
    tag = "Analysis",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Per-column statistics", body = Vec<ColumnStats>),
        (status = 400, description = "No dataset uploaded"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn describe(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match with_analysis_table(&req, &state, stats::describe) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(response) => response,
    }
}

/// Histogram bin counts for one numeric column
#[utoipa::path(
    get,
    path = "/api/analysis/histogram",
    tag = "Analysis",
    security(("bearer_auth" = [])),
    params(
        ("column" = String, Query, description = "Numeric column header"),
        ("bins" = Option<usize>, Query, description = "Bin count, clamped to 5..=100 (default 20)")
    ),
    responses(
        (status = 200, description = "Equal-width bins", body = Histogram),
        (status = 400, description = "No dataset, unknown or non-numeric column"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn histogram(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<HistogramQuery>,
) -> impl Responder {
    let result = with_analysis_table(&req, &state, |table| {
        stats::histogram(table, &query.column, query.bins)
    });
    match result {
        Ok(Ok(histogram)) => HttpResponse::Ok().json(histogram),
        Ok(Err(err)) => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string())),
        Err(response) => response,
    }
}

/// Most frequent values of one column
#[utoipa::path(
    get,
    path = "/api/analysis/value-counts",
    tag = "Analysis",
    security(("bearer_auth" = [])),
    params(
        ("column" = String, Query, description = "Column header"),
        ("top" = Option<usize>, Query, description = "How many values to return (default 5)")
    ),
    responses(
        (status = 200, description = "Values ordered by frequency", body = ValueCounts),
        (status = 400, description = "No dataset or unknown column"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn value_counts(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ValueCountsQuery>,
) -> impl Responder {
    let result = with_analysis_table(&req, &state, |table| {
        stats::value_counts(table, &query.column, query.top)
    });
    match result {
        Ok(Ok(counts)) => HttpResponse::Ok().json(counts),
        Ok(Err(err)) => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string())),
        Err(response) => response,
    }
}

/// Configure analysis routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/analysis")
            .route("/upload", web::post().to(upload_dataset))
            .route("/summary", web::get().to(summary))
            .route("/describe", web::get().to(describe))
            .route("/histogram", web::get().to(histogram))
            .route("/value-counts", web::get().to(value_counts)),
    );
}
