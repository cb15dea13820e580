use crate::application::ReviewOptions;
use crate::domain::error::AppError;
use crate::domain::issue::Issue;
use crate::infrastructure::spreadsheet::read_table_bytes;
use crate::interfaces::state::AppState;
use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use validator::Validate;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub sheet: Option<String>,
    pub file_name: Option<String>,
    #[validate(length(min = 1))]
    pub file_base64: String,
    #[validate(range(min = 1, max = 10000))]
    pub max_rows: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub html: String,
    pub issues: Vec<Issue>,
    pub records: usize,
    pub fallbacks: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            issues: Vec::new(),
        }
    }
}

#[post("/review")]
async fn review(data: web::Data<HttpState>, req: web::Json<ReviewRequest>) -> impl Responder {
    let req = req.into_inner();

    if let Err(e) = req.validate() {
        add_log(&data.logs, "WARN", "HttpApi", &format!("Rejected request: {}", e));
        return HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()));
    }

    let bytes = match STANDARD.decode(req.file_base64.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            add_log(&data.logs, "WARN", "HttpApi", &format!("Invalid base64 payload: {}", e));
            return HttpResponse::BadRequest()
                .json(ErrorResponse::new(format!("Invalid base64 payload: {}", e)));
        }
    };

    let config = &data.app_state.config;
    let sheet = req.sheet.clone().unwrap_or_else(|| config.sheet.clone());
    let options = ReviewOptions {
        title: req
            .title
            .clone()
            .unwrap_or_else(|| config.report_title.clone()),
        max_rows: req.max_rows,
    };

    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Building review (file={} sheet={} bytes={})",
            req.file_name.as_deref().unwrap_or("-"),
            sheet,
            bytes.len()
        ),
    );

    let file_name = req.file_name.clone();
    let table = match web::block(move || read_table_bytes(file_name.as_deref(), bytes, &sheet)).await {
        Ok(Ok(table)) => table,
        Ok(Err(e)) => return error_response(&data, e),
        Err(e) => return error_response(&data, AppError::Internal(e.to_string())),
    };

    match data
        .app_state
        .press_review_use_case()
        .execute(&table, &options)
        .await
    {
        Ok(review) => {
            let fallbacks = review.fallback_count();
            add_log(
                &data.logs,
                "INFO",
                "HttpApi",
                &format!(
                    "Review built ({} records, {} fallbacks, {} issues)",
                    review.records.len(),
                    fallbacks,
                    review.issues.len()
                ),
            );
            HttpResponse::Ok().json(ReviewResponse {
                records: review.records.len(),
                fallbacks,
                issues: review.issues,
                html: review.html,
            })
        }
        Err(e) => error_response(&data, e),
    }
}

fn error_response(data: &HttpState, err: AppError) -> HttpResponse {
    add_log(&data.logs, "ERROR", "HttpApi", &format!("Review failed: {}", err));
    match err {
        AppError::SchemaError(issues) => HttpResponse::UnprocessableEntity().json(ErrorResponse {
            error: "Colonnes requises introuvables".to_string(),
            issues,
        }),
        AppError::NotFound(msg) | AppError::ValidationError(msg) | AppError::ParseError(msg) => {
            HttpResponse::BadRequest().json(ErrorResponse::new(msg))
        }
        other => HttpResponse::InternalServerError().json(ErrorResponse::new(other.to_string())),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    match data.logs.lock() {
        Ok(logs) => HttpResponse::Ok().json(&*logs),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(review)
            .service(health)
            .service(get_logs),
    );
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }
    if let Ok(mut logs) = logs.lock() {
        logs.push(entry.clone());
        if logs.len() > MAX_LOG_ENTRIES {
            logs.remove(0);
        }
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
) -> std::io::Result<Server> {
    let bind = (
        app_state.config.http_host.clone(),
        app_state.config.http_port,
    );
    let state = web::Data::new(HttpState { app_state, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // single-page UI served from another origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(32 * 1024 * 1024))
            .configure(configure)
    })
    .bind(bind)?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::summarization::tests::{FailingClient, StubClient};
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::llm_clients::LLMClient;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rust_xlsxwriter::Workbook;

    fn xlsx(headers: &[&str], row: &[&str]) -> String {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Articles").unwrap();
        for (col, h) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }
        for (col, v) in row.iter().enumerate() {
            sheet.write_string(1, col as u16, *v).unwrap();
        }
        STANDARD.encode(workbook.save_to_buffer().unwrap())
    }

    fn state(client: Arc<dyn LLMClient + Send + Sync>) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            app_state: Arc::new(AppState::with_client(AppConfig::default(), client)),
            logs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    #[actix_web::test]
    async fn test_review_returns_html_and_issues() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(Arc::new(StubClient::new("Synthèse."))))
                .configure(configure),
        )
        .await;

        let payload = serde_json::json!({
            "title": "Veille <hebdo>",
            "file_name": "revue.xlsx",
            "file_base64": xlsx(
                &["Media", "Date", "URL", "Titre", "Texte"],
                &["Le Monde", "01/02/2023", "https://lemonde.fr/x", "Titre A", "Corps"],
            ),
        });
        let req = actix_test::TestRequest::post()
            .uri("/api/review")
            .set_json(&payload)
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["records"], 1);
        assert_eq!(body["fallbacks"], 0);
        assert_eq!(body["issues"].as_array().unwrap().len(), 0);
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("Veille &lt;hebdo&gt;"));
        assert!(html.contains("<div><b>Résumé:</b> Synthèse.</div>"));
    }

    #[actix_web::test]
    async fn test_unusable_schema_is_422() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(Arc::new(FailingClient)))
                .configure(configure),
        )
        .await;

        let payload = serde_json::json!({
            "file_base64": xlsx(&["Journal", "Titre"], &["Le Monde", "A"]),
        });
        let req = actix_test::TestRequest::post()
            .uri("/api/review")
            .set_json(&payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        let issues = body["issues"].as_array().unwrap();
        assert_eq!(issues.len(), 3);
        assert!(issues[0]
            .as_str()
            .unwrap()
            .starts_with("Colonne requise manquante : published"));
    }

    #[actix_web::test]
    async fn test_bad_payloads_are_400() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(Arc::new(FailingClient)))
                .configure(configure),
        )
        .await;

        for payload in [
            serde_json::json!({ "file_base64": "%%%" }),
            serde_json::json!({ "file_base64": "" }),
            serde_json::json!({ "file_base64": "AAAA", "max_rows": 0 }),
        ] {
            let req = actix_test::TestRequest::post()
                .uri("/api/review")
                .set_json(&payload)
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_missing_sheet_is_500_and_logged() {
        let data = state(Arc::new(FailingClient));
        let app = actix_test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

        let payload = serde_json::json!({
            "sheet": "Feuil1",
            "file_base64": xlsx(&["Media"], &["X"]),
        });
        let req = actix_test::TestRequest::post()
            .uri("/api/review")
            .set_json(&payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let req = actix_test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Vec<LogEntry> = actix_test::call_and_read_body_json(&app, req).await;
        assert!(logs.iter().any(|l| l.level == "ERROR" && l.message.contains("Feuil1")));
    }

    #[test]
    fn test_log_ring_is_bounded() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "Test", &format!("entry {}", i));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "entry 5");
    }
}
