use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CellPosition, DEFAULT_CURRENT_AGE_YEARS, DEFAULT_LIFESPAN_YEARS, LifeMetrics, LifeSnapshot,
    LifeSpanParameters, MAX_LIFESPAN_YEARS, MIN_LIFESPAN_YEARS, MonthGrid, build_snapshot,
};
use crate::present::{
    LegendEntry, MetricsDisplay, TextStyle, format_metrics, legend, render_grid_html,
    render_html_document, render_text,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliOutputFormat {
    Text,
    Ansi,
    Html,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "lifemonths",
    about = "Visualize a life in months: one cell per month, three years per row"
)]
pub struct Cli {
    #[arg(
        long,
        default_value_t = DEFAULT_LIFESPAN_YEARS,
        help = "Adjust the total expected years of life (50-120)"
    )]
    expected_lifespan: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_CURRENT_AGE_YEARS,
        help = "Set your current age (0 up to the expected lifespan)"
    )]
    current_age: u32,
    #[arg(long, value_enum, default_value_t = CliOutputFormat::Ansi)]
    format: CliOutputFormat,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GridPayload {
    expected_lifespan: Option<i64>,
    current_age: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GridResponse {
    expected_lifespan: u32,
    current_age: u32,
    rows: usize,
    columns: usize,
    grid: MonthGrid,
    current_cell: Option<CellPosition>,
    metrics: LifeMetrics,
    display: MetricsDisplay,
    legend: [LegendEntry; 3],
    grid_html: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Copy, Clone, Debug)]
struct ParamNames {
    lifespan: &'static str,
    age: &'static str,
}

const CLI_NAMES: ParamNames = ParamNames {
    lifespan: "--expected-lifespan",
    age: "--current-age",
};

const API_NAMES: ParamNames = ParamNames {
    lifespan: "expectedLifespan",
    age: "currentAge",
};

fn build_params(cli: &Cli) -> Result<LifeSpanParameters, String> {
    validate_params(cli, CLI_NAMES)
}

fn validate_params(cli: &Cli, names: ParamNames) -> Result<LifeSpanParameters, String> {
    if !(MIN_LIFESPAN_YEARS..=MAX_LIFESPAN_YEARS).contains(&cli.expected_lifespan) {
        return Err(format!(
            "{} must be between {MIN_LIFESPAN_YEARS} and {MAX_LIFESPAN_YEARS}",
            names.lifespan
        ));
    }

    if cli.current_age > cli.expected_lifespan {
        return Err(format!(
            "{} must be between 0 and {}",
            names.age, names.lifespan
        ));
    }

    LifeSpanParameters::new(cli.expected_lifespan, cli.current_age).map_err(|e| e.to_string())
}

fn build_grid_response(snapshot: LifeSnapshot) -> GridResponse {
    GridResponse {
        expected_lifespan: snapshot.params.expected_lifespan_years(),
        current_age: snapshot.params.current_age_years(),
        rows: snapshot.grid.rows(),
        columns: snapshot.grid.columns(),
        current_cell: snapshot.grid.current_cell(),
        display: format_metrics(&snapshot.metrics),
        legend: legend(),
        grid_html: render_grid_html(&snapshot.grid),
        metrics: snapshot.metrics,
        grid: snapshot.grid,
    }
}

pub fn render_cli(cli: &Cli) -> Result<String, String> {
    let params = build_params(cli)?;
    let snapshot = build_snapshot(params).map_err(|e| e.to_string())?;
    log::debug!(
        "rendering {} rows for lifespan={} age={}",
        snapshot.grid.rows(),
        params.expected_lifespan_years(),
        params.current_age_years()
    );

    match cli.format {
        CliOutputFormat::Text => Ok(render_text(&snapshot, TextStyle::Plain)),
        CliOutputFormat::Ansi => Ok(render_text(&snapshot, TextStyle::Ansi)),
        CliOutputFormat::Html => Ok(render_html_document(&snapshot)),
        CliOutputFormat::Json => {
            let response = build_grid_response(snapshot);
            serde_json::to_string_pretty(&response)
                .map(|json| format!("{json}\n"))
                .map_err(|e| format!("Failed to serialize grid: {e}"))
        }
    }
}

pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    render_cli(&cli)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/grid", get(grid_get_handler).post(grid_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("Life-in-months HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn grid_get_handler(query: Result<Query<GridPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => grid_handler_impl(payload).await,
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

async fn grid_post_handler(body: Result<Json<GridPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => grid_handler_impl(payload).await,
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

fn rejected_payload_response(msg: &str) -> Response {
    log::warn!("rejected grid request: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

async fn grid_handler_impl(payload: GridPayload) -> Response {
    let params = match api_request_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => {
            log::warn!("rejected grid request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    log::debug!(
        "grid request lifespan={} age={}",
        params.expected_lifespan_years(),
        params.current_age_years()
    );

    match build_snapshot(params) {
        Ok(snapshot) => json_response(StatusCode::OK, build_grid_response(snapshot)),
        Err(e) => {
            log::warn!("grid computation failed: {e}");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<LifeSpanParameters, String> {
    let payload = serde_json::from_str::<GridPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: GridPayload) -> Result<LifeSpanParameters, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.expected_lifespan {
        cli.expected_lifespan = u32::try_from(v).map_err(|_| {
            format!(
                "{} must be between {MIN_LIFESPAN_YEARS} and {MAX_LIFESPAN_YEARS}",
                API_NAMES.lifespan
            )
        })?;
    }
    if let Some(v) = payload.current_age {
        cli.current_age = u32::try_from(v).map_err(|_| {
            format!(
                "{} must be between 0 and {}",
                API_NAMES.age, API_NAMES.lifespan
            )
        })?;
    }

    validate_params(&cli, API_NAMES)
}

fn default_cli_for_api() -> Cli {
    Cli {
        expected_lifespan: DEFAULT_LIFESPAN_YEARS,
        current_age: DEFAULT_CURRENT_AGE_YEARS,
        format: CliOutputFormat::Json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CellStatus;

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn build_params_accepts_defaults() {
        let params = build_params(&sample_cli()).expect("valid defaults");
        assert_eq!(params.expected_lifespan_years(), 90);
        assert_eq!(params.current_age_years(), 30);
    }

    #[test]
    fn build_params_rejects_lifespan_outside_slider_range() {
        let mut cli = sample_cli();
        cli.expected_lifespan = 49;
        let err = build_params(&cli).expect_err("must reject lifespan below 50");
        assert!(err.contains("--expected-lifespan"));

        cli.expected_lifespan = 121;
        let err = build_params(&cli).expect_err("must reject lifespan above 120");
        assert!(err.contains("--expected-lifespan"));
    }

    #[test]
    fn build_params_rejects_age_beyond_lifespan() {
        let mut cli = sample_cli();
        cli.expected_lifespan = 60;
        cli.current_age = 61;
        let err = build_params(&cli).expect_err("must reject age > lifespan");
        assert!(err.contains("--current-age"));
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let params = api_request_from_json(r#"{"expectedLifespan": 75, "currentAge": 40}"#)
            .expect("json should parse");
        assert_eq!(params.expected_lifespan_years(), 75);
        assert_eq!(params.current_age_years(), 40);
    }

    #[test]
    fn api_request_from_json_falls_back_to_defaults() {
        let params = api_request_from_json("{}").expect("json should parse");
        assert_eq!(params, LifeSpanParameters::default());
    }

    #[test]
    fn api_request_rejects_negative_age() {
        let err = api_request_from_json(r#"{"currentAge": -1}"#).expect_err("negative age");
        assert!(err.contains("currentAge"));
    }

    #[test]
    fn api_request_rejects_negative_lifespan() {
        let err = api_request_from_json(r#"{"expectedLifespan": -90}"#).expect_err("negative");
        assert!(err.contains("expectedLifespan"));
    }

    #[test]
    fn grid_response_serialization_contains_expected_fields() {
        let snapshot = build_snapshot(LifeSpanParameters::default()).expect("valid snapshot");
        let response = build_grid_response(snapshot);
        let json = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(json["rows"], 31);
        assert_eq!(json["columns"], 36);
        assert_eq!(json["grid"][9][35], CellStatus::Current.code());
        assert_eq!(json["grid"][10][0], CellStatus::Future.code());
        assert_eq!(json["currentCell"]["row"], 9);
        assert_eq!(json["currentCell"]["column"], 35);
        assert_eq!(json["metrics"]["monthsLived"], 360);
        assert_eq!(json["metrics"]["monthsTotal"], 1080);
        assert_eq!(json["display"]["monthsTotal"], "1,080");
        assert_eq!(json["display"]["percentageLived"], "33.33%");
        assert_eq!(json["legend"][0]["color"], "blue");
        assert_eq!(json["legend"][0]["status"], 1);
        assert!(json["gridHtml"].as_str().is_some_and(|html| html.contains("life-grid")));
    }

    #[test]
    fn grid_response_for_age_zero_has_no_current_cell() {
        let params = LifeSpanParameters::new(50, 0).expect("valid parameters");
        let response = build_grid_response(build_snapshot(params).expect("valid snapshot"));
        let json = serde_json::to_value(&response).expect("response should serialize");
        assert!(json["currentCell"].is_null());
        assert_eq!(json["rows"], 17);
    }

    #[test]
    fn render_cli_text_format() {
        let cli = Cli::try_parse_from([
            "lifemonths",
            "--expected-lifespan",
            "50",
            "--current-age",
            "0",
            "--format",
            "text",
        ])
        .expect("flags should parse");
        let output = render_cli(&cli).expect("valid render");
        assert!(output.contains("Total Months: 600"));
        let grid_lines: Vec<&str> = output.lines().filter(|line| line.len() == 36).collect();
        assert_eq!(grid_lines.len(), 17);
        assert!(grid_lines.iter().all(|line| !line.contains('@')));
    }

    #[test]
    fn render_cli_json_format_is_parseable() {
        let cli = Cli::try_parse_from(["lifemonths", "--format", "json"]).expect("flags parse");
        let output = render_cli(&cli).expect("valid render");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(json["expectedLifespan"], 90);
        assert_eq!(json["currentAge"], 30);
    }

    #[test]
    fn render_cli_withholds_output_on_invalid_age() {
        let cli = Cli::try_parse_from([
            "lifemonths",
            "--expected-lifespan",
            "50",
            "--current-age",
            "51",
        ])
        .expect("flags should parse");
        assert!(render_cli(&cli).is_err());
    }

    #[tokio::test]
    async fn grid_handler_returns_grid_for_valid_payload() {
        let payload = GridPayload {
            expected_lifespan: Some(120),
            current_age: Some(120),
        };
        let response = grid_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );

        let json = body_json(response).await;
        assert_eq!(json["rows"], 41);
        assert_eq!(json["grid"][39][35], 2);
        assert_eq!(json["metrics"]["monthsTotal"], 1440);
        assert_eq!(json["display"]["percentageLived"], "100.00%");
    }

    #[tokio::test]
    async fn grid_handler_rejects_invalid_payload() {
        let payload = GridPayload {
            expected_lifespan: Some(60),
            current_age: Some(70),
        };
        let response = grid_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json.get("grid").is_none());
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|msg| msg == "currentAge must be between 0 and expectedLifespan")
        );
    }

    #[tokio::test]
    async fn grid_get_handler_reports_malformed_query_as_json() {
        let uri: axum::http::Uri = "/api/grid?currentAge=abc"
            .parse()
            .expect("valid uri");
        let response = grid_get_handler(Query::try_from_uri(&uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json.get("grid").is_none());
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("deserialize query string"))
        );
    }

    #[tokio::test]
    async fn grid_post_handler_reports_malformed_body_as_json() {
        let response =
            grid_post_handler(Json::from_bytes(br#"{"expectedLifespan": "ninety"}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    #[tokio::test]
    async fn grid_get_handler_accepts_valid_query() {
        let uri: axum::http::Uri = "/api/grid?expectedLifespan=50&currentAge=0"
            .parse()
            .expect("valid uri");
        let response = grid_get_handler(Query::try_from_uri(&uri)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["rows"], 17);
        assert!(json["currentCell"].is_null());
    }

    #[test]
    fn cli_errors_name_flags_and_api_errors_name_keys() {
        let mut cli = sample_cli();
        cli.expected_lifespan = 60;
        cli.current_age = 61;
        let cli_err = build_params(&cli).expect_err("must reject age > lifespan");
        assert_eq!(cli_err, "--current-age must be between 0 and --expected-lifespan");

        let api_err = api_request_from_json(r#"{"expectedLifespan": 130}"#)
            .expect_err("must reject lifespan above 120");
        assert_eq!(api_err, "expectedLifespan must be between 50 and 120");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not found");
    }
}
