//! Parley relay entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration (optional toml file plus the
//! environment), then either prints it or starts the HTTP relay.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use secrecy::SecretString;

use parley_infra::config::{apply_env_overrides, load_relay_config, process_env, resolve_api_key};
use parley_observe::tracing_setup::{init_tracing, shutdown_tracing};
use parley_types::config::RelayConfig;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need configuration or logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,parley=debug,tower_http=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let file_config = load_relay_config(&cli.config).await;
    let config = apply_env_overrides(file_config, process_env)?;
    let api_key = resolve_api_key(process_env);

    let result = match cli.command {
        Commands::Serve { port, host } => {
            let config = RelayConfig {
                port: port.unwrap_or(config.port),
                host: host.unwrap_or(config.host),
                ..config
            };
            serve(config, api_key, cli.quiet).await
        }
        Commands::Config => cli::config::show_config(&config, api_key.is_some(), cli.json),
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}

async fn serve(config: RelayConfig, api_key: Option<SecretString>, quiet: bool) -> anyhow::Result<()> {
    if api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; upstream calls will be rejected");
    }
    tracing::info!(
        base_url = %config.upstream.base_url,
        isolate_sessions = config.isolate_sessions,
        discard_partial_turns = config.discard_partial_turns,
        "Starting relay"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::init(config, api_key)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        println!(
            "  {} Parley relay listening on {}",
            console::style("🎙").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
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
}
