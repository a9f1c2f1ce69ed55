use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use specials_finder::config::AppConfig;
use specials_finder::error::AppError;
use specials_finder::telemetry;
use specials_finder::workflows::specials::{
    day_label, specials_router, ConfiguredRepository, SpecialRecord, SpecialsService,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "specials-finder",
    about = "Turn OCR text from restaurant menus and signs into food special records",
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
    /// Print the restaurant name inferred from OCR text
    ExtractName(InputArgs),
    /// Group OCR lines into specials per day of the week
    GroupDays(InputArgs),
    /// Save OCR text as a named special
    Save(SaveArgs),
    /// List saved specials, newest first
    List(ListArgs),
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

#[derive(Args, Debug)]
struct InputArgs {
    /// Read text from this file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SaveArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Restaurant name to store instead of the inferred one
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Maximum number of specials to print (defaults to APP_LIST_LIMIT)
    #[arg(long)]
    limit: Option<usize>,
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

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => run_server(config, args).await,
        Command::ExtractName(args) => run_extract_name(args),
        Command::GroupDays(args) => run_group_days(&config, args),
        Command::Save(args) => run_save(&config, args),
        Command::List(args) => run_list(&config, args),
    }
}

fn read_input(args: &InputArgs) -> Result<String, AppError> {
    match &args.file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn build_service(config: &AppConfig) -> SpecialsService<ConfiguredRepository> {
    let repository = ConfiguredRepository::from_config(&config.storage.store);
    info!(store = %repository.describe(), "specials store selected");
    SpecialsService::new(Arc::new(repository))
}

async fn run_server(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let service = Arc::new(build_service(&config));
    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(specials_router(service, config.storage.list_limit))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "specials finder ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_extract_name(args: InputArgs) -> Result<(), AppError> {
    let text = read_input(&args)?;
    println!("{}", specials_finder::workflows::specials::extract_name(&text));
    Ok(())
}

fn run_group_days(config: &AppConfig, args: InputArgs) -> Result<(), AppError> {
    let text = read_input(&args)?;
    let lines: Vec<&str> = text.lines().collect();
    let report = build_service(config).group_days(&lines);

    if report.days.is_empty() {
        println!("No day markers recognized");
        return Ok(());
    }

    for special in report.days.iter() {
        println!("{}: {}", special.label(), special.description);
    }
    for line in &report.ambiguous_lines {
        println!("note: '{line}' names more than one day");
    }
    Ok(())
}

fn run_save(config: &AppConfig, args: SaveArgs) -> Result<(), AppError> {
    let text = read_input(&args.input)?;
    let service = build_service(config);
    let draft = service.draft(&text);
    let special = match args.name {
        Some(name) => draft.with_name(name),
        None => draft.accept(),
    };

    let record = service.save_named(special)?;
    println!(
        "Saved special #{} for {}",
        record.id.0, record.restaurant_name
    );
    Ok(())
}

fn run_list(config: &AppConfig, args: ListArgs) -> Result<(), AppError> {
    let limit = args.limit.unwrap_or(config.storage.list_limit);
    let records = build_service(config).recent(limit)?;

    if records.is_empty() {
        println!("No specials saved yet.");
        return Ok(());
    }

    for record in &records {
        render_record(record);
    }
    Ok(())
}

fn render_record(record: &SpecialRecord) {
    match record.day {
        Some(day) => println!("{} ({})", record.restaurant_name, day_label(day)),
        None => println!("{}", record.restaurant_name),
    }
    println!("{}", record.special_details);
    println!("Added on {}", record.date_added.format("%Y-%m-%d %H:%M"));
    println!("---");
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
