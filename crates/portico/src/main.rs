//! Portico gateway CLI.
//!
//! `serve` runs the gateway; `merge` prints one aggregation pass;
//! `issue-token` prints a credential signed with the configured secret.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use portico::api::AppState;
use portico::server::{self, ServerConfig};
use portico::GatewayConfig;
use portico_spec::{serialize, Format};
use portico_telemetry::{LogFormat, LogWriter, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "portico", about = "Portico API gateway", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the gateway HTTP server.
    Serve {
        /// Path to the gateway configuration file.
        #[arg(long, env = "PORTICO_CONFIG", default_value = "portico.yaml")]
        config: PathBuf,

        /// Listen address (overrides `listen` in the config file).
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// HMAC signing secret (overrides `auth.secret`).
        #[arg(long, env = "PORTICO_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,

        /// Log level filter; RUST_LOG takes precedence.
        #[arg(long, env = "PORTICO_LOG_LEVEL", default_value = "info")]
        log_level: String,

        /// Log output format (json or pretty).
        #[arg(long, env = "PORTICO_LOG_FORMAT", default_value = "json", value_parser = parse_log_format)]
        log_format: LogFormat,
    },

    /// Fetch and merge all sources once, printing the result to stdout.
    Merge {
        /// Path to the gateway configuration file.
        #[arg(long, env = "PORTICO_CONFIG", default_value = "portico.yaml")]
        config: PathBuf,

        /// Output encoding (json or yaml).
        #[arg(long, default_value = "json", value_parser = parse_format)]
        format: Format,

        /// Log level filter for stderr; RUST_LOG takes precedence.
        #[arg(long, env = "PORTICO_LOG_LEVEL", default_value = "warn")]
        log_level: String,

        /// Log output format (json or pretty).
        #[arg(long, env = "PORTICO_LOG_FORMAT", default_value = "json", value_parser = parse_log_format)]
        log_format: LogFormat,
    },

    /// Issue a credential for a subject.
    IssueToken {
        /// Path to the gateway configuration file.
        #[arg(long, env = "PORTICO_CONFIG", default_value = "portico.yaml")]
        config: PathBuf,

        /// Subject (user name) of the credential.
        #[arg(long)]
        subject: String,

        /// HMAC signing secret (overrides `auth.secret`).
        #[arg(long, env = "PORTICO_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,
    },
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::parse(s).ok_or_else(|| format!("unknown log format '{}' (expected json or pretty)", s))
}

fn parse_format(s: &str) -> Result<Format, String> {
    Format::parse(s).ok_or_else(|| format!("unknown format '{}' (expected json or yaml)", s))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve {
            config,
            listen,
            jwt_secret,
            log_level,
            log_format,
        } => {
            let telemetry = TelemetryConfig::new()
                .with_log_level(log_level)
                .with_log_format(log_format);
            if let Err(e) = portico_telemetry::init(&telemetry) {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
            block_on(run_server(&config, listen, jwt_secret))
        }

        Command::Merge {
            config,
            format,
            log_level,
            log_format,
        } => {
            // stdout carries the document.
            let telemetry = TelemetryConfig::new()
                .with_log_level(log_level)
                .with_log_format(log_format)
                .with_log_writer(LogWriter::Stderr);
            if let Err(e) = portico_telemetry::init(&telemetry) {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
            block_on(merge_once(&config, format))
        }

        Command::IssueToken {
            config,
            subject,
            jwt_secret,
        } => issue_token(&config, &subject, jwt_secret),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn block_on<F: std::future::Future<Output = anyhow::Result<()>>>(future: F) -> anyhow::Result<()> {
    tokio::runtime::Runtime::new()?.block_on(future)
}

async fn run_server(
    config_path: &Path,
    listen: Option<SocketAddr>,
    jwt_secret: Option<String>,
) -> anyhow::Result<()> {
    let config = GatewayConfig::load(config_path)?.with_secret_override(jwt_secret);

    let state = AppState {
        aggregator: Arc::new(config.build_aggregator()?),
        gate: Arc::new(config.build_gate()?),
        forwarder: Arc::new(config.build_forwarder()?),
    };
    tracing::info!(
        sources = state.aggregator.registry().len(),
        routes = state.forwarder.routes().len(),
        merge_order = ?config.merge_order,
        "configuration loaded"
    );

    server::run(ServerConfig {
        listen_addr: listen.unwrap_or(config.listen),
        state,
    })
    .await
}

async fn merge_once(config_path: &Path, format: Format) -> anyhow::Result<()> {
    let config = GatewayConfig::load(config_path)?;
    let aggregator = config.build_aggregator()?;

    let merged = aggregator.aggregate().await;
    let body = serialize(&merged, format)?;
    println!("{}", body);
    Ok(())
}

fn issue_token(
    config_path: &Path,
    subject: &str,
    jwt_secret: Option<String>,
) -> anyhow::Result<()> {
    let config = GatewayConfig::load(config_path)?.with_secret_override(jwt_secret);
    let validator = config.build_validator()?;
    println!("{}", validator.issue(subject)?);
    Ok(())
}
