use anyhow::{Context, Result};
use azsqlpool::azure::auth::AzureCredentials;
use azsqlpool::azure::elastic_pools::ElasticPoolsClient;
use azsqlpool::azure::http::format_api_error;
use azsqlpool::config::Config;
use azsqlpool::resource::{ElasticPoolResource, ResourceData, ResourceRegistry, RESOURCE_TYPE};
use azsqlpool::ResourceError;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage Azure SQL elastic pools from a declarative attribute file
#[derive(Parser, Debug)]
#[command(name = "azsqlpool", version, about, long_about = None)]
struct Args {
    /// Azure subscription to use
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// Management endpoint (defaults to the public cloud)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Run in read-only mode (block all write operations)
    #[arg(long, global = true)]
    readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an attribute file against the resource schema
    Validate {
        /// JSON object of attributes
        file: PathBuf,
        #[arg(long = "type", default_value = RESOURCE_TYPE)]
        resource_type: String,
    },
    /// Create the pool described by an attribute file
    Create { file: PathBuf },
    /// Refresh a pool from the API
    Read {
        #[arg(long)]
        id: String,
    },
    /// Apply an attribute file to an existing pool
    Update {
        #[arg(long)]
        id: String,
        file: PathBuf,
    },
    /// Delete a pool
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Adopt an existing pool by id
    Import { id: String },
    /// Store --subscription/--endpoint and poll settings in the config file
    Configure {
        /// Fallback delay between long-running operation polls, in seconds
        #[arg(long)]
        poll_interval: Option<u64>,
    },
}

impl Command {
    fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Create { .. }
                | Command::Update { .. }
                | Command::Delete { .. }
                | Command::Configure { .. }
        )
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
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
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
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azsqlpool started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("azsqlpool").join("azsqlpool.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azsqlpool").join("azsqlpool.log");
    }
    PathBuf::from("azsqlpool.log")
}

fn read_attributes(path: &Path) -> Result<ResourceData> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let attributes: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{:?} must contain a JSON object of attributes", path))?;
    Ok(ResourceData::from_attributes(attributes))
}

fn print_state(data: &ResourceData) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Attach a user-facing summary to remote failures
fn describe(err: ResourceError) -> anyhow::Error {
    let summary = err.api_error().map(format_api_error);
    match summary {
        Some(summary) => anyhow::Error::new(err).context(summary),
        None => anyhow::Error::new(err),
    }
}

/// Stored configuration with CLI overrides applied
fn load_config(args: &Args) -> Config {
    let mut config = Config::load();
    if args.subscription.is_some() {
        config.subscription_id = args.subscription.clone();
    }
    if args.endpoint.is_some() {
        config.endpoint = args.endpoint.clone();
    }
    config
}

/// Build the API client (CLI > config > environment)
fn connect(args: &Args) -> Result<ElasticPoolsClient> {
    let config = load_config(args);

    let credentials = AzureCredentials::from_env().context(
        "No access token found. Set ARM_ACCESS_TOKEN (e.g. from `az account get-access-token`)",
    )?;

    Ok(ElasticPoolsClient::new(config.build_client(credentials)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    if args.readonly && args.command.is_write() {
        anyhow::bail!("Write operations are disabled in read-only mode");
    }

    let resource = ElasticPoolResource::new();

    match &args.command {
        Command::Validate { file, resource_type } => {
            let registry = ResourceRegistry::with_defaults();
            let definition = registry.get(resource_type).with_context(|| {
                format!(
                    "Unknown resource type {:?} (known: {:?})",
                    resource_type,
                    registry.type_names()
                )
            })?;
            let data = read_attributes(file)?;
            definition
                .schema
                .validate(&data)
                .map_err(ResourceError::Validation)?;
            println!("{} is valid", file.display());
        }
        Command::Create { file } => {
            let client = connect(&args)?;
            let mut data = read_attributes(file)?;
            resource.create(&mut data, &client).await.map_err(describe)?;
            print_state(&data)?;
        }
        Command::Read { id } => {
            let client = connect(&args)?;
            let mut data = ResourceData::new();
            data.set_id(id.as_str());
            resource.read(&mut data, &client).await.map_err(describe)?;
            if !data.has_id() {
                eprintln!("Pool no longer exists");
            }
            print_state(&data)?;
        }
        Command::Update { id, file } => {
            let client = connect(&args)?;
            let mut data = read_attributes(file)?;
            data.set_id(id.as_str());
            resource.update(&mut data, &client).await.map_err(describe)?;
            print_state(&data)?;
        }
        Command::Delete { id } => {
            let client = connect(&args)?;
            let mut data = ResourceData::new();
            data.set_id(id.as_str());
            resource.delete(&mut data, &client).await.map_err(describe)?;
            println!("Deleted {}", id);
        }
        Command::Import { id } => {
            let client = connect(&args)?;
            let data = resource.import(id, &client).await.map_err(describe)?;
            print_state(&data)?;
        }
        Command::Configure { poll_interval } => {
            let mut config = load_config(&args);
            if poll_interval.is_some() {
                config.poll_interval_secs = *poll_interval;
            }
            config.save().context("Failed to save configuration")?;
            match Config::config_path() {
                Some(path) => println!("Saved configuration to {}", path.display()),
                None => eprintln!("No config directory available; nothing saved"),
            }
        }
    }

    Ok(())
}
