use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_token, session_expired};
use crate::docx::DocxFile;
use crate::session::{SessionStore, UploadedFile, UploadedTable};
use crate::table::{ColumnMapping, ColumnSelection, DataTable};
use crate::{AppState, ErrorResponse};

use super::engine::{LetterGenerator, ProgressSink};
use super::models::{LogEntry, Progress};

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadTemplateResponse {
    pub filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadDataResponse {
    pub filename: String,
    pub rows: usize,
    pub headers: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewRequest {
    #[schema(example = "Budi")]
    pub nama: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewResponse {
    pub nama: String,
    pub text: String,
    pub filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub archive_entries: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NamesResponse {
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct NamaQuery {
    pub nama: String,
}

/// Progress snapshots written into the session as the run advances, so a
/// concurrent poll of `/generate/progress` sees them.
struct StoreProgress<'a> {
    sessions: &'a SessionStore,
    token: Uuid,
}

impl ProgressSink for StoreProgress<'_> {
    fn report(&mut self, progress: &Progress) {
        self.sessions
            .with_session(self.token, |session| session.progress = Some(progress.clone()));
    }
}

/// Read the first `file` field of a multipart payload into memory.
pub(crate) async fn read_multipart_file(mut payload: Multipart) -> Result<(String, Vec<u8>), String> {
    while let Some(mut field) = payload.try_next().await.map_err(|e| e.to_string())? {
        let (name, filename) = {
            let disposition = field
                .content_disposition()
                .ok_or_else(|| "Content-Disposition not set".to_string())?;
            (
                disposition.get_name().map(str::to_string),
                disposition.get_filename().map(str::to_string),
            )
        };
        if name.as_deref() != Some("file") {
            continue;
        }

        let filename = filename.unwrap_or_else(|| "upload.bin".to_string());
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|e| e.to_string())? {
            bytes.extend_from_slice(&chunk);
        }
        return Ok((filename, bytes));
    }
    Err("multipart field 'file' missing".to_string())
}

/// Upload the letter template (.docx)
#[utoipa::path(
    post,
    path = "/api/generate/template",
    tag = "Generator",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Template cached in session", body = UploadTemplateResponse),
        (status = 400, description = "Not a valid .docx file"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn upload_template(
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

    if let Err(err) = DocxFile::open(&bytes) {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "invalid template: {err}"
        )));
    }

    log::info!("template {filename:?} uploaded ({} bytes)", bytes.len());
    let stored = state.sessions.with_session(token, move |session| {
        session.template = Some(UploadedFile {
            filename: filename.clone(),
            bytes,
        });
        filename
    });
    match stored {
        Some(filename) => HttpResponse::Ok().json(UploadTemplateResponse { filename }),
        None => session_expired(),
    }
}

/// Upload the recipient table (.xlsx or .csv)
#[utoipa::path(
    post,
    path = "/api/generate/data",
    tag = "Generator",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Table cached in session", body = UploadDataResponse),
        (status = 400, description = "Unreadable or unsupported table"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn upload_data(
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

    log::info!("data {filename:?} uploaded: {} rows", table.len());
    let response = UploadDataResponse {
        filename: filename.clone(),
        rows: table.len(),
        headers: table.headers.clone(),
    };
    let stored = state.sessions.with_session(token, move |session| {
        session.last_data_rows = table.len();
        // A new table invalidates the previous column selection.
        session.selection = None;
        session.table = Some(UploadedTable { filename, table });
    });
    match stored {
        Some(()) => HttpResponse::Ok().json(response),
        None => session_expired(),
    }
}

/// Choose which columns hold the name and the link
#[utoipa::path(
    post,
    path = "/api/generate/columns",
    tag = "Generator",
    security(("bearer_auth" = [])),
    request_body = ColumnSelection,
    responses(
        (status = 200, description = "Selection validated and stored"),
        (status = 400, description = "Column missing from the uploaded table"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn set_columns(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ColumnSelection>,
) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let selection = body.into_inner();

    let result = state.sessions.with_session(token, |session| {
        let table = match session.table.as_ref() {
            Some(upload) => &upload.table,
            None => return Err("upload a recipient table first".to_string()),
        };
        ColumnMapping::resolve(table, &selection).map_err(|err| err.to_string())?;
        session.selection = Some(selection.clone());
        Ok(())
    });

    match result {
        None => session_expired(),
        Some(Err(message)) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        Some(Ok(())) => HttpResponse::Ok().json(serde_json::json!({ "message": "columns set" })),
    }
}

/// List recipient names for the preview picker
#[utoipa::path(
    get,
    path = "/api/generate/names",
    tag = "Generator",
    security(("bearer_auth" = [])),
    params(("search" = Option<String>, Query, description = "Case-insensitive substring filter")),
    responses(
        (status = 200, description = "Unique names in the selected name column", body = NamesResponse),
        (status = 400, description = "No table or column selection yet"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_names(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let needle = query.search.to_lowercase();

    let result = state.sessions.with_session(token, |session| {
        let (table, selection) = match (session.table.as_ref(), session.selection.as_ref()) {
            (Some(upload), Some(selection)) => (&upload.table, selection),
            _ => return Err("upload a table and choose columns first".to_string()),
        };
        let mapping =
            ColumnMapping::resolve(table, selection).map_err(|err| err.to_string())?;

        let mut names: Vec<String> = Vec::new();
        for row in &table.rows {
            let nama = row.get(mapping.name).map(|s| s.trim()).unwrap_or_default();
            if nama.is_empty() || !nama.to_lowercase().contains(&needle) {
                continue;
            }
            if !names.iter().any(|existing| existing == nama) {
                names.push(nama.to_string());
            }
        }
        Ok(names)
    });

    match result {
        None => session_expired(),
        Some(Err(message)) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        Some(Ok(names)) => HttpResponse::Ok().json(NamesResponse { names }),
    }
}

/// Preview one letter as flattened text
#[utoipa::path(
    post,
    path = "/api/generate/preview",
    tag = "Generator",
    security(("bearer_auth" = [])),
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Rendered preview", body = PreviewResponse),
        (status = 400, description = "Missing uploads or unknown name"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn preview(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PreviewRequest>,
) -> impl Responder {
    match render_preview(&req, &state, &body.nama) {
        Ok(output) => HttpResponse::Ok().json(PreviewResponse {
            nama: output.nama,
            text: output.text,
            filename: output.filename,
        }),
        Err(response) => response,
    }
}

/// Download the previewed letter as a single .docx
#[utoipa::path(
    get,
    path = "/api/generate/preview/download",
    tag = "Generator",
    security(("bearer_auth" = [])),
    params(("nama" = String, Query, description = "Recipient name to preview")),
    responses(
        (status = 200, description = "The rendered document", content_type = "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        (status = 400, description = "Missing uploads or unknown name"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn preview_download(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<NamaQuery>,
) -> impl Responder {
    match render_preview(&req, &state, &query.nama) {
        Ok(output) => HttpResponse::Ok()
            .content_type("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.filename),
            ))
            .body(output.bytes),
        Err(response) => response,
    }
}

/// Shared preview path: resolve the row by name, then run the single-row
/// variant of the pipeline.
fn render_preview(
    req: &HttpRequest,
    state: &web::Data<AppState>,
    nama: &str,
) -> Result<super::engine::PreviewOutput, HttpResponse> {
    let token = require_token(req)?;

    let fetched = state.sessions.with_session(token, |session| {
        (
            session.template.clone(),
            session.table.clone(),
            session.selection.clone(),
        )
    });
    let Some((template, table, selection)) = fetched else {
        return Err(session_expired());
    };
    let (Some(template), Some(table), Some(selection)) = (template, table, selection) else {
        return Err(HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "upload a template, a table and a column selection first",
        )));
    };

    let mapping = ColumnMapping::resolve(&table.table, &selection)
        .map_err(|err| HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string())))?;

    // First row with a matching name, like the original preview picker.
    let row = table
        .table
        .rows
        .iter()
        .find(|row| row.get(mapping.name).map(|s| s.trim()) == Some(nama.trim()))
        .ok_or_else(|| {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                "no row with name {nama:?}"
            )))
        })?;
    let link = row.get(mapping.link).map(|s| s.trim()).unwrap_or_default();

    LetterGenerator::new(&template.bytes)
        .preview(nama, link)
        .map_err(|err| {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        })
}

/// Generate all letters
#[utoipa::path(
    post,
    path = "/api/generate/run",
    tag = "Generator",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Run finished; inspect the log for per-row outcomes", body = RunSummary),
        (status = 400, description = "Missing uploads or column selection"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn run_generation(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };

    let fetched = state.sessions.with_session(token, |session| {
        (
            session.template.clone(),
            session.table.clone(),
            session.selection.clone(),
        )
    });
    let Some((template, table, selection)) = fetched else {
        return session_expired();
    };
    let (Some(template), Some(table), Some(selection)) = (template, table, selection) else {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "upload a template, a table and a column selection first",
        ));
    };

    let mapping = match ColumnMapping::resolve(&table.table, &selection) {
        Ok(mapping) => mapping,
        Err(err) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        }
    };

    log::info!(
        "generating {} letters from {:?} with template {:?}",
        table.table.len(),
        table.filename,
        template.filename
    );

    let generator = LetterGenerator::new(&template.bytes);
    let mut sink = StoreProgress {
        sessions: &state.sessions,
        token,
    };
    let outcome = match generator.generate_all(&table.table, mapping, &mut sink) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("archive finalization failed: {err}");
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("failed to build zip archive"));
        }
    };

    let summary = RunSummary {
        total: outcome.log.len(),
        success: outcome.success_count(),
        failed: outcome.log.len() - outcome.success_count(),
        archive_entries: outcome.entry_count,
    };
    log::info!(
        "run done: {} ok, {} failed, {} archive entries",
        summary.success,
        summary.failed,
        summary.archive_entries
    );

    let stored = state.sessions.with_session(token, move |session| {
        session.generate_log = outcome.log;
        session.archive = Some(outcome.archive);
    });
    match stored {
        Some(()) => HttpResponse::Ok().json(summary),
        None => session_expired(),
    }
}

/// Poll generation progress
#[utoipa::path(
    get,
    path = "/api/generate/progress",
    tag = "Generator",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Latest progress snapshot, or null before the first run", body = Progress),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn progress(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };
    match state
        .sessions
        .with_session(token, |session| session.progress.clone())
    {
        Some(progress) => HttpResponse::Ok().json(progress),
        None => session_expired(),
    }
}

/// Fetch the generation log
#[utoipa::path(
    get,
    path = "/api/generate/log",
    tag = "Generator",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One entry per processed row, in input order", body = Vec<LogEntry>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn log_entries(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };
    match state
        .sessions
        .with_session(token, |session| session.generate_log.clone())
    {
        Some(log) => HttpResponse::Ok().json(log),
        None => session_expired(),
    }
}

/// Download the finished archive
#[utoipa::path(
    get,
    path = "/api/generate/archive",
    tag = "Generator",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "surat_massal.zip", content_type = "application/zip"),
        (status = 404, description = "No finished run in this session"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn download_archive(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let token = match require_token(&req) {
        Ok(token) => token,
        Err(response) => return response,
    };
    match state
        .sessions
        .with_session(token, |session| session.archive.clone())
    {
        None => session_expired(),
        Some(None) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("no archive generated yet"))
        }
        Some(Some(bytes)) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"surat_massal.zip\"",
            ))
            .body(bytes),
    }
}

/// Configure generator routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/generate")
            .route("/template", web::post().to(upload_template))
            .route("/data", web::post().to(upload_data))
            .route("/columns", web::post().to(set_columns))
            .route("/names", web::get().to(list_names))
            .route("/preview", web::post().to(preview))
            .route("/preview/download", web::get().to(preview_download))
            .route("/run", web::post().to(run_generation))
            .route("/progress", web::get().to(progress))
            .route("/log", web::get().to(log_entries))
            .route("/archive", web::get().to(download_archive)),
    );
}
