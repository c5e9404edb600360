/// Log Classification Frontend
///
/// Serves the upload page, forwards CSV uploads to the external
/// classification endpoint, and renders/downloads the classified result.
use anyhow::Context;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::csv_preview::CsvPreview;

const PREVIEW_ROWS: usize = 5;
const DOWNLOAD_FILENAME: &str = "classified_logs.csv";

// ============================================================================
// Application State
// ============================================================================

/// One successful classification round-trip, kept in memory so the
/// download action can serve the exact bytes the backend returned
#[derive(Debug, Clone)]
struct UploadSession {
    csv_bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    http_client: reqwest::Client,
    sessions: Arc<Mutex<HashMap<String, UploadSession>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http_client: reqwest::Client::new(),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/download/:id", get(download))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    sessions_held: usize,
}

// ============================================================================
// HTTP Handlers
// ============================================================================

/// Health check
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        sessions_held: state.sessions.lock().unwrap().len(),
    })
}

/// Upload page
async fn index() -> Html<String> {
    Html(render_index_page())
}

/// Accept a CSV upload, forward it to the classification endpoint, and
/// render the result page
async fn upload(State(state): State<AppState>, multipart: Multipart) -> Html<String> {
    match handle_upload(&state, multipart).await {
        Ok(page) => Html(page),
        Err(e) => {
            error!("Upload failed: {:#}", e);
            Html(render_error_page(&format!("An error occurred: {:#}", e)))
        }
    }
}

/// Stream a stored classification result back as a named download
async fn download(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let session = state.sessions.lock().unwrap().get(&id).cloned();

    match session {
        Some(session) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
                ),
            ],
            session.csv_bytes,
        )
            .into_response(),
        None => {
            warn!("Download requested for unknown session: {}", id);
            (StatusCode::NOT_FOUND, "No classified file for this id").into_response()
        }
    }
}

// ============================================================================
// Upload Flow
// ============================================================================

async fn handle_upload(state: &AppState, mut multipart: Multipart) -> anyhow::Result<String> {
    let mut file_name = String::from("upload.csv");
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                file_name = name.to_string();
            }
            file_bytes = Some(field.bytes().await?.to_vec());
            break;
        }
    }

    let file_bytes = file_bytes.ok_or_else(|| anyhow::anyhow!("No file field in upload"))?;

    info!(
        "Forwarding {} ({} bytes) to {}",
        file_name,
        file_bytes.len(),
        state.config.classify_endpoint
    );

    let part = reqwest::multipart::Part::bytes(file_bytes)
        .file_name(file_name.clone())
        .mime_str("text/csv")?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = state
        .http_client
        .post(&state.config.classify_endpoint)
        .multipart(form)
        .send()
        .await
        .context("Failed to reach classification endpoint")?;

    let status = response.status();
    let body = response.bytes().await?.to_vec();

    if !status.is_success() {
        let detail = extract_error_detail(&body);
        warn!(
            "Classification endpoint rejected {}: {} ({})",
            file_name, status, detail
        );
        return Ok(render_error_page(&format!(
            "Server returned error: {}",
            detail
        )));
    }

    let preview = CsvPreview::from_bytes(&body, PREVIEW_ROWS)
        .context("Classification endpoint returned a body that is not valid CSV")?;

    let session_id = new_session_id();

    let local_path = if state.config.local_mode {
        Some(write_local_artifact(&session_id, &body)?)
    } else {
        None
    };

    info!(
        "Classified {}: {} row(s), session {}",
        file_name, preview.total_rows, session_id
    );

    state
        .sessions
        .lock()
        .unwrap()
        .insert(session_id.clone(), UploadSession { csv_bytes: body });

    Ok(render_result_page(&session_id, &preview, local_path.as_deref()))
}

/// `detail` field of a JSON error body, falling back to the raw text
fn extract_error_detail(body: &[u8]) -> String {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(detail) = json.get("detail").and_then(|v| v.as_str()) {
            return detail.to_string();
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

fn new_session_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

/// Local mode only: write the classified CSV under the OS temp dir so the
/// file:// link on the result page resolves
fn write_local_artifact(session_id: &str, bytes: &[u8]) -> anyhow::Result<std::path::PathBuf> {
    let path = std::env::temp_dir().join(format!("classified_{}.csv", session_id));
    std::fs::write(&path, bytes)
        .with_context(|| format!("Failed to write local artifact: {}", path.display()))?;
    Ok(path)
}

// ============================================================================
// Page Rendering
// ============================================================================

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page_shell(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Log Classifier</title>
<style>
  body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
  .error {{ color: #b00020; border: 1px solid #b00020; padding: 0.75rem; border-radius: 4px; }}
  .success {{ color: #1b5e20; border: 1px solid #1b5e20; padding: 0.75rem; border-radius: 4px; }}
  .table-scroll {{ max-height: 20rem; overflow: auto; margin: 1rem 0; }}
  table {{ border-collapse: collapse; width: 100%; }}
  th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }}
  th {{ background: #f0f0f0; }}
  .button {{ display: inline-block; padding: 0.5rem 1rem; background: #1a73e8; color: #fff;
             text-decoration: none; border-radius: 4px; }}
</style>
</head>
<body>
<h1>📄 Log Classification Frontend</h1>
{body}
</body>
</html>
"#,
        body = body
    )
}

fn render_index_page() -> String {
    page_shell(
        r#"<p>Upload a log CSV with <code>source</code> and <code>log_message</code> columns.
The backend will return the classified logs.</p>
<form action="/upload" method="post" enctype="multipart/form-data">
  <input type="file" name="file" accept=".csv" required>
  <button type="submit">Upload and Classify</button>
</form>"#,
    )
}

fn render_error_page(message: &str) -> String {
    let body = format!(
        r#"<p class="error">❌ {}</p>
<p><a href="/">Try another upload</a></p>"#,
        escape_html(message)
    );
    page_shell(&body)
}

fn render_result_page(
    session_id: &str,
    preview: &CsvPreview,
    local_path: Option<&std::path::Path>,
) -> String {
    let mut body = String::from(r#"<p class="success">✅ Logs classified successfully!</p>"#);

    body.push_str("\n<h2>🔍 Preview of Results</h2>\n");
    body.push_str(&render_preview_table(preview));

    if preview.is_truncated() {
        body.push_str(&format!(
            "<p>Showing first {} of {} rows.</p>\n",
            preview.rows.len(),
            preview.total_rows
        ));
    }

    body.push_str(&format!(
        r#"<p><a class="button" href="/download/{}" download>📥 Download Classified CSV</a></p>"#,
        session_id
    ));

    if let Some(path) = local_path {
        body.push_str(&format!(
            "\n<p><a href=\"file://{}\" target=\"_blank\">📂 Open CSV File</a></p>",
            escape_html(&path.display().to_string())
        ));
    }

    page_shell(&body)
}

fn render_preview_table(preview: &CsvPreview) -> String {
    let mut table = String::from("<div class=\"table-scroll\"><table>\n<tr>");

    for header in &preview.headers {
        table.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    table.push_str("</tr>\n");

    for row in &preview.rows {
        table.push_str("<tr>");
        for field in row {
            table.push_str(&format!("<td>{}</td>", escape_html(field)));
        }
        table.push_str("</tr>\n");
    }

    table.push_str("</table></div>\n");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Config {
            classify_endpoint: "http://127.0.0.1:9/classify/".to_string(),
            frontend_port: 0,
            local_mode: false,
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_the_upload_form() {
        let app = router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("multipart/form-data"));
        assert!(html.contains(r#"accept=".csv""#));
        assert!(html.contains("log_message"));
    }

    #[tokio::test]
    async fn test_health_reports_session_count() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["sessions_held"], 0);
    }

    #[tokio::test]
    async fn test_download_of_unknown_session_is_404() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/download/deadbeef")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_detail_prefers_the_json_detail_field() {
        assert_eq!(
            extract_error_detail(br#"{"detail": "bad columns"}"#),
            "bad columns"
        );
        assert_eq!(
            extract_error_detail(b"plain text failure"),
            "plain text failure"
        );
        assert_eq!(extract_error_detail(br#"{"other": 1}"#), r#"{"other": 1}"#);
    }

    #[test]
    fn test_preview_cells_are_html_escaped() {
        let preview = CsvPreview {
            headers: vec!["log_message".to_string()],
            rows: vec![vec!["<script>alert(1)</script>".to_string()]],
            total_rows: 1,
        };

        let page = render_result_page("abc123", &preview, None);
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("/download/abc123"));
    }

    #[test]
    fn test_result_page_links_local_artifact_only_in_local_mode() {
        let preview = CsvPreview {
            headers: vec!["source".to_string()],
            rows: vec![],
            total_rows: 0,
        };

        let page = render_result_page("abc123", &preview, None);
        assert!(!page.contains("file://"));

        let page = render_result_page(
            "abc123",
            &preview,
            Some(std::path::Path::new("/tmp/classified_abc123.csv")),
        );
        assert!(page.contains("file:///tmp/classified_abc123.csv"));
    }
}
