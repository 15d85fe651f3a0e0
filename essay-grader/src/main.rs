//! essay-grader - LLM-backed essay grading service
//!
//! Configuration is resolved in priority order: command line, environment,
//! TOML file, compiled defaults. `OPENAI_API_KEY` and `SECRET_KEY` have no
//! default and must be supplied.

use anyhow::{Context, Result};
use clap::Parser;
use essay_common::api::TokenService;
use essay_common::config::{CliOverrides, ConfigResolver};
use essay_grader::evaluation::PipelineVariant;
use essay_grader::llm::{LlmGateway, OpenAIClient};
use essay_grader::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "essay-grader")]
#[command(about = "Essay grading service backed by an LLM evaluator")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "ESSAY_GRADER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// LLM model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        CliOverrides {
            config_path: args.config,
            host: args.host,
            port: args.port,
            model: args.model,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: CliOverrides = Args::parse().into();

    // Installed before config resolution so resolver logs are kept; the
    // configured level is swapped in once known. RUST_LOG wins over both.
    let rust_log = EnvFilter::try_from_default_env().ok();
    let env_override = rust_log.is_some();
    let bootstrap_level = cli.log_level.as_deref().unwrap_or("info");
    let (filter, filter_handle) = reload::Layer::new(
        rust_log.unwrap_or_else(|| default_log_filter(bootstrap_level)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ConfigResolver::from_process_env()
        .resolve(&cli)
        .context("Failed to resolve configuration")?;

    if !env_override {
        if let Err(e) = filter_handle.reload(default_log_filter(&config.log_level)) {
            warn!("Failed to apply configured log level {}: {}", config.log_level, e);
        }
    }

    info!(
        "Starting essay-grader v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let provider = OpenAIClient::from_settings(&config.llm).context("Failed to create LLM client")?;
    let llm = LlmGateway::new(Arc::new(provider), config.llm.timeout)
        .with_model(config.llm.model.clone())
        .with_temperature(config.llm.temperature);
    info!(
        model = %llm.model(),
        base_url = %config.llm.base_url,
        timeout_secs = config.llm.timeout.as_secs(),
        "LLM client configured"
    );

    let tokens = TokenService::from_settings(&config.auth).context("Failed to configure token service")?;
    if tokens.has_credential_table() {
        info!(users = config.auth.users.len(), "Credential table loaded");
    } else {
        warn!("No credential table configured; /v1/token accepts any non-empty username");
    }

    let variant = if config.grading.generate_corrections {
        PipelineVariant::WithCorrections
    } else {
        PipelineVariant::ScoresOnly
    };
    info!(variant = ?variant, "Evaluation pipeline selected");

    let state = AppState::new(llm, tokens).with_pipeline_variant(variant);
    let app = build_router(state);

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("essay-grader listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("essay-grader stopped");
    Ok(())
}

/// Filter applying `level` to this service's crates
fn default_log_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "essay_grader={level},essay_common={level},tower_http={level}",
        level = level
    ))
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
