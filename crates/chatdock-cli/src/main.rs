//! chatdock CLI: chat widget and one-shot client for a question-answering backend

use chatdock_engine::{
    BackendError, Config, ConfigError, Conversation, HttpBackend, Session, SystemClock,
    DEFAULT_CONFIG_PATH,
};
use chatdock_tui::TuiOptions;
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Env var holding the default log filter.
const LOG_ENV: &str = "CHATDOCK_LOG";

/// Terminal chat widget for a question-answering backend
#[derive(Parser)]
#[command(name = "chatdock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "CHATDOCK_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the chat endpoint
    #[arg(long, global = true, env = "CHATDOCK_ENDPOINT")]
    endpoint: Option<String>,

    /// Log filter (e.g. debug, chatdock_engine=trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat widget (default when no command specified)
    Tui {
        /// Start with the chat panel open
        #[arg(long)]
        open: bool,

        /// Write logs to this file (logging is off otherwise)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question (read from stdin when omitted)
        question: Option<String>,
    },

    /// Check whether the backend is up
    Health,

    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid log filter: {0}")]
    LogFilter(String),

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Config already exists at {0}")]
    ConfigExists(String),

    #[error("{0}")]
    Tui(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let command = cli.command.unwrap_or(Commands::Tui {
        open: false,
        log_file: None,
    });

    match &command {
        Commands::Tui { log_file, .. } => {
            if let Some(path) = log_file {
                init_file_logging(cli.log_level.as_deref(), path)?;
            }
        }
        _ => init_stderr_logging(cli.log_level.as_deref())?,
    }

    if let Commands::Config { init: true } = command {
        return cmd_config_init(&cli.config);
    }

    let config = load_config(&cli.config, cli.endpoint.as_deref())?;

    match command {
        Commands::Tui { open, .. } => cmd_tui(&config, open),
        Commands::Ask { question } => cmd_ask(&config, question),
        Commands::Health => cmd_health(&config),
        Commands::Config { .. } => cmd_config_show(&config),
    }
}

fn log_filter(level: Option<&str>) -> Result<EnvFilter, CliError> {
    match level {
        Some(level) => EnvFilter::try_new(level).map_err(|e| CliError::LogFilter(e.to_string())),
        None => Ok(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))),
    }
}

fn init_stderr_logging(level: Option<&str>) -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::LogFilter(e.to_string()))
}

// The TUI owns the terminal, so logs go to a file or nowhere.
fn init_file_logging(level: Option<&str>, path: &Path) -> Result<(), CliError> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| CliError::LogFilter(e.to_string()))
}

fn load_config(path: &Path, endpoint: Option<&str>) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(path)?;
    if let Some(endpoint) = endpoint {
        debug!(endpoint, "Endpoint overridden");
        config = config.with_endpoint(endpoint);
    }
    config.validate()?;
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn cmd_tui(config: &Config, open: bool) -> Result<ExitCode, CliError> {
    info!(endpoint = %config.endpoint, "Starting TUI");
    let rt = runtime()?;
    rt.block_on(chatdock_tui::run_tui(config, TuiOptions { open }))
        .map_err(|e| CliError::Tui(e.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_ask(config: &Config, question: Option<String>) -> Result<ExitCode, CliError> {
    let question = match question {
        Some(q) => q,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    if question.trim().is_empty() {
        return Err(CliError::EmptyQuestion);
    }

    let backend = HttpBackend::new(&config.endpoint, config.http_options())?;
    let session = Session::new(config.session_options(), Arc::new(SystemClock));
    let mut conversation = Conversation::new(session, backend);

    let rt = runtime()?;
    rt.block_on(conversation.submit(question.trim_end_matches(['\r', '\n'])));

    let session = conversation.session();
    let reply = session
        .messages()
        .last()
        .map(|m| m.text().to_string())
        .unwrap_or_default();

    if session.last_failure().is_some() {
        eprintln!("{reply}");
        Ok(ExitCode::FAILURE)
    } else {
        println!("{reply}");
        Ok(ExitCode::SUCCESS)
    }
}

fn cmd_health(config: &Config) -> Result<ExitCode, CliError> {
    let backend = HttpBackend::new(&config.endpoint, config.http_options())?;
    let rt = runtime()?;

    match rt.block_on(backend.health()) {
        Ok(status) if status.is_healthy() => {
            println!("healthy");
            Ok(ExitCode::SUCCESS)
        }
        Ok(status) => {
            println!("unhealthy: {}", status.status);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            println!("unhealthy: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_config_show(config: &Config) -> Result<ExitCode, CliError> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_init(path: &Path) -> Result<ExitCode, CliError> {
    if path.exists() {
        return Err(CliError::ConfigExists(path.display().to_string()));
    }
    Config::default().save(path)?;
    println!("Created {}", path.display());
    Ok(ExitCode::SUCCESS)
}
