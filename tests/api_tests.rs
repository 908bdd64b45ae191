//! HTTP surface tests: routes wired the way `run()` wires them, driven with
//! `actix_web::test` against an in-memory `AppState`.

mod common;

use actix_web::http::header;
use actix_web::{test, web, App};
use uuid::Uuid;

use surat_massal_server::auth::{self, StaticCredentialVerifier};
use surat_massal_server::session::{UploadedFile, UploadedTable};
use surat_massal_server::table::{ColumnSelection, DataTable};
use surat_massal_server::{analysis, dashboard, generate, AppState};

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data($state.clone()).service(
                web::scope("/api")
                    .configure(auth::handlers::config)
                    .configure(generate::handlers::config)
                    .configure(analysis::handlers::config)
                    .configure(dashboard::config),
            ),
        )
        .await
    };
}

fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(Box::new(StaticCredentialVerifier::new(
        "aku", "adalah",
    ))))
}

fn bearer(token: Uuid) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Put a template, a recipient table and a column selection into the session,
/// as the upload endpoints would.
fn seed_workspace(state: &web::Data<AppState>, token: Uuid, rows: &[(&str, &str)]) {
    let template = common::build_template_docx(&[
        "Halo {{nama_penyelenggara}},",
        "Silakan klik [short_link] untuk info.",
    ]);
    let table = DataTable::from_csv(&common::recipients_csv(rows)).expect("csv table");
    state.sessions.with_session(token, |session| {
        session.template = Some(UploadedFile {
            filename: "template.docx".to_string(),
            bytes: template,
        });
        session.last_data_rows = table.len();
        session.table = Some(UploadedTable {
            filename: "data.csv".to_string(),
            table,
        });
        session.selection = Some(ColumnSelection {
            name_column: "nama".to_string(),
            link_column: "link".to_string(),
        });
    });
}

#[actix_web::test]
async fn test_login_issues_a_usable_token() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({ "username": "aku", "password": "adalah" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "aku");
    let token: Uuid = body["token"].as_str().unwrap().parse().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "aku");
    assert_eq!(body["total_letters"], 0);
    assert_eq!(body["templates_available"], 0);
}

#[actix_web::test]
async fn test_login_rejects_bad_credentials() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({ "username": "aku", "password": "salah" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert!(state.sessions.is_empty());
}

#[actix_web::test]
async fn test_missing_or_stale_token_is_unauthorized() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/session").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header(bearer(Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_logout_invalidates_the_session() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_full_generation_flow_over_http() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");
    seed_workspace(
        &state,
        token,
        &[
            ("Budi", "https://a.co"),
            ("Siti", "https://b.co"),
            ("Budi", "https://c.co"),
        ],
    );

    let req = test::TestRequest::post()
        .uri("/api/generate/run")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let summary: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["success"], 3);
    assert_eq!(summary["failed"], 0);
    assert_eq!(summary["archive_entries"], 2);

    let req = test::TestRequest::get()
        .uri("/api/generate/log")
        .insert_header(bearer(token))
        .to_request();
    let log: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(log.as_array().unwrap().len(), 3);
    assert_eq!(log[0]["nama"], "Budi");
    assert_eq!(log[1]["nama"], "Siti");

    let req = test::TestRequest::get()
        .uri("/api/generate/progress")
        .insert_header(bearer(token))
        .to_request();
    let progress: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(progress["percent"], 100);
    assert_eq!(progress["label"], "3 / 3");

    let req = test::TestRequest::get()
        .uri("/api/generate/archive")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );
    let bytes = test::read_body(resp).await;
    assert_eq!(
        common::zip_entry_names(&bytes),
        vec!["Budi.docx", "Siti.docx"]
    );
}

#[actix_web::test]
async fn test_run_without_uploads_is_rejected() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");

    let req = test::TestRequest::post()
        .uri("/api/generate/run")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/generate/archive")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_column_selection_is_validated() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");
    seed_workspace(&state, token, &[("Budi", "https://a.co")]);

    let req = test::TestRequest::post()
        .uri("/api/generate/columns")
        .insert_header(bearer(token))
        .set_json(serde_json::json!({ "name_column": "tautan", "link_column": "link" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/generate/columns")
        .insert_header(bearer(token))
        .set_json(serde_json::json!({ "name_column": "nama", "link_column": "link" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_names_are_unique_and_searchable() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");
    seed_workspace(
        &state,
        token,
        &[
            ("Budi", "https://a.co"),
            ("Siti", "https://b.co"),
            ("Budi", "https://c.co"),
        ],
    );

    let req = test::TestRequest::get()
        .uri("/api/generate/names")
        .insert_header(bearer(token))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["names"], serde_json::json!(["Budi", "Siti"]));

    let req = test::TestRequest::get()
        .uri("/api/generate/names?search=si")
        .insert_header(bearer(token))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["names"], serde_json::json!(["Siti"]));
}

#[actix_web::test]
async fn test_preview_renders_one_letter() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");
    seed_workspace(&state, token, &[("Budi", "https://a.co")]);

    let req = test::TestRequest::post()
        .uri("/api/generate/preview")
        .insert_header(bearer(token))
        .set_json(serde_json::json!({ "nama": "Budi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["nama"], "Budi");
    assert_eq!(body["filename"], "preview_Budi.docx");
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("Halo Budi,"));
    assert!(text.contains("https://a.co"));

    let req = test::TestRequest::post()
        .uri("/api/generate/preview")
        .insert_header(bearer(token))
        .set_json(serde_json::json!({ "nama": "Tidak Ada" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_template_upload_via_multipart() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");

    let docx = common::build_template_docx(&["Halo {{nama_penyelenggara}}."]);
    let boundary = "batas-tes-unggah";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"surat.docx\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(&docx);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let req = test::TestRequest::post()
        .uri("/api/generate/template")
        .insert_header(bearer(token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["filename"], "surat.docx");

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header(bearer(token))
        .to_request();
    let info: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(info["has_template"], true);
}

#[actix_web::test]
async fn test_lang_switch_and_workspace_reset() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");
    seed_workspace(&state, token, &[("Budi", "https://a.co")]);

    let req = test::TestRequest::put()
        .uri("/api/session/lang")
        .insert_header(bearer(token))
        .set_json(serde_json::json!({ "lang": "en" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/session/reset")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/session")
        .insert_header(bearer(token))
        .to_request();
    let info: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(info["lang"], "en");
    assert_eq!(info["has_template"], false);
    assert_eq!(info["has_table"], false);
}

#[actix_web::test]
async fn test_i18n_table_endpoint() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/i18n/id").to_request();
    let table: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(table["generate_title"], "Buat Surat Massal");

    let req = test::TestRequest::get().uri("/api/i18n/en").to_request();
    let table: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(table["generate_title"], "Generate Bulk Letters");

    let req = test::TestRequest::get().uri("/api/i18n/xx").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_analysis_endpoints_over_http() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");

    let csv = b"kota,skor\nJakarta,10\nBandung,20\nJakarta,\n";
    let table = DataTable::from_csv(csv).expect("csv table");
    state.sessions.with_session(token, |session| {
        session.analysis_table = Some(UploadedTable {
            filename: "data.csv".to_string(),
            table,
        });
    });

    let req = test::TestRequest::get()
        .uri("/api/analysis/summary")
        .insert_header(bearer(token))
        .to_request();
    let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["rows"], 3);
    assert_eq!(summary["columns"], 2);

    let req = test::TestRequest::get()
        .uri("/api/analysis/describe")
        .insert_header(bearer(token))
        .to_request();
    let described: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let stats = described.as_array().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["column"], "skor");
    assert_eq!(stats[0]["mean"], 15.0);

    let req = test::TestRequest::get()
        .uri("/api/analysis/histogram?column=kota")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/analysis/value-counts?column=kota&top=1")
        .insert_header(bearer(token))
        .to_request();
    let counts: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(counts["entries"][0]["value"], "Jakarta");
    assert_eq!(counts["entries"][0]["count"], 2);
}

#[actix_web::test]
async fn test_analysis_requires_an_uploaded_dataset() {
    let state = test_state();
    let app = test_app!(state);
    let token = state.sessions.create("aku");

    let req = test::TestRequest::get()
        .uri("/api/analysis/summary")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
