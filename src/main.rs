use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use llmctl::api::{ApiClient, Key, Model};
use llmctl::config::{ProviderConfig, Settings};
use llmctl::manifest::{self, Manifest};
use llmctl::resource::schema::redact;
use llmctl::resource::{lookup, Attributes, Instance, KeyController, Lifecycle, ModelController};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Reconcile LiteLLM models and API keys
#[derive(Parser, Debug)]
#[command(name = "llmctl", version, about, long_about = None)]
struct Args {
    /// Control plane API key (falls back to LITELLM_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Control plane base URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Per-request timeout in seconds
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
    /// Refresh one resource and print its attributes
    Get { kind: Kind, id: String },
    /// Look up an entity that must exist
    Lookup { kind: Kind, id: String },
    /// Create or update everything declared in a manifest
    Apply {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Show what `apply` would change
    Drift {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete one resource
    Delete { kind: Kind, id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Model,
    Key,
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
    fn as_filter(self) -> Option<&'static str> {
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
    let Some(filter) = level.as_filter() else {
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
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("llmctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("llmctl").join("llmctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".llmctl").join("llmctl.log");
    }
    PathBuf::from("llmctl.log")
}

fn controller(client: &ApiClient, kind: Kind) -> Box<dyn Lifecycle + '_> {
    match kind {
        Kind::Model => Box::new(ModelController::new(client)),
        Kind::Key => Box::new(KeyController::new(client)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let explicit = Settings {
        api_key: args.api_key.clone(),
        endpoint: args.endpoint.clone(),
        timeout_secs: args.timeout,
    };
    let config = ProviderConfig::resolve(&explicit, &Settings::load())?;
    let client = ApiClient::new(config)?;

    match run(&client, args.command).await {
        Ok(code) => Ok(code),
        Err(err) => {
            match err.downcast_ref::<llmctl::Error>() {
                Some(e) => eprintln!("Error: {}", e.user_message()),
                None => eprintln!("Error: {err:?}"),
            }
            tracing::error!("{:?}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(client: &ApiClient, command: Command) -> Result<ExitCode> {
    match command {
        Command::Get { kind, id } => {
            let controller = controller(client, kind);
            let mut instance = Instance::existing(id.as_str());
            controller.read(&mut instance).await?;

            if !instance.exists() {
                eprintln!("{} '{}' does not exist", controller.kind(), id);
                return Ok(ExitCode::FAILURE);
            }
            print_json(&redact(controller.schema(), &instance.attributes))?;
        }
        Command::Lookup { kind, id } => {
            let attrs: Attributes = match kind {
                Kind::Model => lookup::<Model>(client, &id).await?,
                Kind::Key => lookup::<Key>(client, &id).await?,
            };
            print_json(&attrs)?;
        }
        Command::Apply { file } => {
            let manifest = Manifest::load(&file)?;
            let outcomes = manifest::reconcile(client, &manifest).await;
            print_json(&outcomes)?;

            for outcome in outcomes.iter().filter(|o| !o.secrets.is_empty()) {
                eprintln!(
                    "{} '{}' has generated secrets in the output above; they are not shown again",
                    outcome.kind, outcome.id
                );
            }

            if outcomes.iter().any(|o| o.is_failure()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Drift { file } => {
            let manifest = Manifest::load(&file)?;
            print_json(&manifest::plan(client, &manifest).await)?;
        }
        Command::Delete { kind, id } => {
            let controller = controller(client, kind);
            let mut instance = Instance::existing(id.as_str());
            controller.delete(&mut instance).await?;
            eprintln!("{} '{}' deleted", controller.kind(), id);
        }
    }

    Ok(ExitCode::SUCCESS)
}
