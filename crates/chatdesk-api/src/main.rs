//! Chatdesk CLI and REST API entry point.
//!
//! Binary name: `chatdesk`
//!
//! Parses CLI arguments, loads configuration, initializes database and
//! services, then dispatches to a command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use chatdesk_infra::config::load_app_config;
use chatdesk_infra::filesystem::resolve_data_dir;
use chatdesk_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};

use cli::{Cli, Commands, UserCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chatdesk", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    let config = load_app_config(&data_dir).await;

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if matches!(cli.command, Commands::Serve { .. }) => "info",
        0 => "warn",
        1 => "info,chatdesk=debug",
        _ => "trace",
    };
    let options = TracingOptions::new(filter)
        .json(config.logging.json)
        .otel(config.logging.otel);
    if let Err(e) = init_tracing(&options) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let state = AppState::build(&data_dir, config).await?;
    let result = run(&cli, state.clone()).await;

    state.db_pool.close().await;
    shutdown_tracing();
    result
}

async fn run(cli: &Cli, state: AppState) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Serve { port, host } => serve(state, host.clone(), *port, cli.quiet).await?,

        Commands::User { action } => match action {
            UserCommand::Create {
                username,
                password,
                role,
            } => {
                cli::user::create_user(&state, username, password, *role, cli.json).await?;
            }
        },

        Commands::Chats { user_id } => {
            cli::chat::list_chats(&state, *user_id, cli.json).await?;
        }

        Commands::History { chat_id, user } => {
            cli::chat::show_history(&state, chat_id, *user, cli.json).await?;
        }

        Commands::Metrics => {
            cli::admin::metrics(&state, cli.json).await?;
        }

        Commands::Recent { limit } => {
            cli::admin::recent(&state, *limit, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    Ok(())
}

async fn serve(
    state: AppState,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, data_dir = %state.data_dir.display(), "chatdesk API listening");
    if !quiet {
        println!(
            "  {} Chatdesk API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// A signal handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
