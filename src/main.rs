use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use gcecloud::cloud::{ApiVersion, Filter, Key, KeyScope, Resource};
use gcecloud::config::Config;
use gcecloud::error::format_error;
use gcecloud::gcp::GcpClient;
use gcecloud::metrics::InMemoryMetrics;
use gcecloud::resource::{get_all_kind_names, get_kind};
use gcecloud::ComputeCloud;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Versioned Compute Engine resource accessors
#[derive(Parser, Debug)]
#[command(name = "gcecloud", version, about, long_about = None)]
struct Args {
    /// GCP project to use
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Compute API endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// API surface to call (v1, beta, alpha)
    #[arg(long = "api-version", global = true)]
    api_version: Option<ApiVersion>,

    /// Call timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the known resource kinds
    Kinds,
    /// Get one resource
    Get {
        kind: String,
        name: String,
        #[command(flatten)]
        location: Location,
    },
    /// List resources
    List {
        kind: String,
        #[command(flatten)]
        location: Location,
        /// Filter term, `field=regexp` or `field!=regexp` (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Create a resource from a JSON file
    Create {
        kind: String,
        file: PathBuf,
        #[command(flatten)]
        location: Location,
    },
    /// Update a resource from a JSON file
    Update {
        kind: String,
        file: PathBuf,
        #[command(flatten)]
        location: Location,
    },
    /// Delete a resource
    Delete {
        kind: String,
        name: String,
        #[command(flatten)]
        location: Location,
    },
}

#[derive(ClapArgs, Debug, Clone)]
struct Location {
    /// Region of a regional resource
    #[arg(long, conflicts_with = "zone")]
    region: Option<String>,

    /// Zone of a zonal resource
    #[arg(long)]
    zone: Option<String>,
}

impl Location {
    fn scope(&self) -> KeyScope {
        match (&self.region, &self.zone) {
            (Some(region), _) => KeyScope::Regional(region.clone()),
            (None, Some(zone)) => KeyScope::Zonal(zone.clone()),
            (None, None) => KeyScope::Global,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match (std::env::var("RUST_LOG").ok(), level.as_directive()) {
        (Some(_), _) => EnvFilter::from_default_env(),
        (None, Some(directive)) => EnvFilter::new(directive),
        (None, None) => return Ok(None),
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcecloud started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcecloud").join("gcecloud.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcecloud").join("gcecloud.log");
    }
    PathBuf::from("gcecloud.log")
}

fn read_object(path: &PathBuf) -> Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    if matches!(args.command, Command::Kinds) {
        for name in get_all_kind_names() {
            if let Some(kind) = get_kind(name) {
                let versions: Vec<String> = kind.versions.iter().map(ToString::to_string).collect();
                println!("{:<24} {:<9} {}", name, kind.scope, versions.join(","));
            }
        }
        return Ok(());
    }

    let mut config = Config::load();
    if let Some(timeout) = args.timeout {
        config.call_timeout_secs = Some(timeout);
    }

    let project = args
        .project
        .clone()
        .unwrap_or_else(|| config.effective_project());
    if project.is_empty() {
        return Err(anyhow::anyhow!(
            "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag"
        ));
    }
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| config.effective_endpoint());
    let version = args.api_version.unwrap_or_else(|| config.effective_version());

    tracing::info!("Using project: {}, endpoint: {}, version: {}", project, endpoint, version);

    let client = GcpClient::new(&project, &endpoint).await?;
    let metrics = Arc::new(InMemoryMetrics::new());
    let cloud = ComputeCloud::from_config(client, metrics.clone(), &config);

    let result = run(&cloud, version, args.command).await;

    for series in metrics.snapshot() {
        tracing::debug!(
            request = %series.labels.request(),
            version = %series.labels.version,
            successes = series.successes,
            failures = series.failure_count(),
            latency_ms = series.latency_sum.as_millis() as u64,
            "call metrics"
        );
    }

    // Security: API errors are reported with a short summary only
    result.map_err(|err| match err.downcast_ref::<gcecloud::Error>() {
        Some(api_err) => anyhow::anyhow!(format_error(api_err)),
        None => err,
    })
}

async fn run(cloud: &ComputeCloud, version: ApiVersion, command: Command) -> Result<()> {
    match command {
        Command::Kinds => Ok(()),
        Command::Get { kind, name, location } => {
            let accessor = cloud.resource(&kind)?;
            let key = Key::in_scope(name, location.scope())?;
            print_json(&accessor.get_key(version, &key).await?)
        }
        Command::List {
            kind,
            location,
            filters,
        } => {
            let accessor = cloud.resource(&kind)?;
            let filter = filters
                .iter()
                .try_fold(Filter::None, |acc, term| Filter::parse_term(term).map(|f| acc.and(f)))?;
            let items = accessor.list_at(version, &location.scope(), &filter).await?;
            print_json(&Value::Array(items))
        }
        Command::Create { kind, file, location } => {
            let accessor = cloud.resource(&kind)?;
            let obj = read_object(&file)?;
            let key = Key::in_scope(Resource::name(&obj), location.scope())?;
            accessor.create_key(version, &key, &obj).await?;
            eprintln!("Created {}", key);
            Ok(())
        }
        Command::Update { kind, file, location } => {
            let accessor = cloud.resource(&kind)?;
            let obj = read_object(&file)?;
            let key = Key::in_scope(Resource::name(&obj), location.scope())?;
            accessor.update_key(version, &key, &obj).await?;
            eprintln!("Updated {}", key);
            Ok(())
        }
        Command::Delete { kind, name, location } => {
            let accessor = cloud.resource(&kind)?;
            let key = Key::in_scope(name, location.scope())?;
            accessor.delete_key(version, &key).await?;
            eprintln!("Deleted {}", key);
            Ok(())
        }
    }
}
