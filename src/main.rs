use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use declaration_desk::config::AppConfig;
use declaration_desk::error::AppError;
use declaration_desk::infra::{
    demo_directory, demo_enrollment_declaration, demo_requester, demo_templates,
    MemoryBlobPublisher, MemoryRequestRepository,
};
use declaration_desk::telemetry;
use declaration_desk::workflows::declarations::generation::BatchGenerationOrchestrator;
use declaration_desk::workflows::declarations::render::document::{Letter, LetterRenderer};
use declaration_desk::workflows::declarations::render::placeholder;
use declaration_desk::workflows::declarations::router::{declaration_router, DeclarationState};
use declaration_desk::workflows::declarations::service::RequestLifecycleService;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Declaration Desk",
    about = "Issue enrollment declaration documents through a reviewed request lifecycle",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with declaration letters locally
    Letter {
        #[command(subcommand)]
        command: LetterCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum LetterCommand {
    /// Render a sample declaration letter to a PDF file
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output path for the rendered PDF
    #[arg(long, default_value = "declaration.pdf")]
    output: PathBuf,
    /// Issue date stamped into the letter (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Letter {
            command: LetterCommand::Render(args),
        } => run_letter_render(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    // Demo wiring: in-memory collaborators seeded with sample users and
    // templates. Production deployments provide database-backed stores and
    // the Drive publisher here instead.
    let requests = Arc::new(MemoryRequestRepository::default());
    let directory = Arc::new(demo_directory());
    let templates = Arc::new(demo_templates());
    let publisher = Arc::new(MemoryBlobPublisher::default());

    let lifecycle = Arc::new(RequestLifecycleService::new(
        requests.clone(),
        directory.clone(),
        templates.clone(),
    ));
    let generation = Arc::new(BatchGenerationOrchestrator::new(
        requests,
        directory,
        templates,
        publisher,
        config.documents.namespace.clone(),
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(declaration_router(DeclarationState {
            lifecycle,
            generation,
        }))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "declaration desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_letter_render(args: RenderArgs) -> Result<(), AppError> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let profile = demo_requester();
    let declaration = demo_enrollment_declaration();

    let context = placeholder::declaration_context(&profile, date);
    let letter = Letter {
        title: declaration.title.clone(),
        body: placeholder::substitute(&declaration.body, &context),
        footer: placeholder::substitute(&declaration.footer, &context),
    };

    let bytes = LetterRenderer::new().render(&letter)?;
    std::fs::write(&args.output, &bytes)?;

    println!("Rendered sample declaration for {}", profile.name);
    println!("Issue date: {}", placeholder::long_date_pt(date));
    println!("Wrote {} bytes to {}", bytes.len(), args.output.display());
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
