use std::{net::SocketAddr, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod auth;
mod authz;
mod config;
mod db;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

#[cfg(test)]
mod tests;

use config::PorticoConfig;
use state::AppState;

/// CLI arguments for the Portico server
#[derive(Parser, Debug)]
#[command(version, about = "Portico platform backend", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the server (default)
    Serve,
    /// Write a default configuration file
    Init {
        /// Path to create the config file
        #[arg(short, long, default_value = "portico.toml")]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => run_init(&output, force),
        Some(Command::Serve) | None => run_server(args.config.as_deref()).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("portico=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_server(config_path: Option<&std::path::Path>) -> ExitCode {
    init_tracing();

    let config = match config_path {
        Some(path) => match PorticoConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => PorticoConfig::default(),
    };

    let addr = SocketAddr::from((config.server.host, config.server.port));
    let bootstrap = config.auth.bootstrap.clone();

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        rules = state.authz.table().len(),
        "Loaded permission table"
    );

    if let Some(bootstrap) = bootstrap {
        if let Err(e) = state.services.users.bootstrap(&bootstrap).await {
            eprintln!("Failed to bootstrap admin user: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let app = routes::router(state.clone());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        addr = %addr,
        base_path = %state.config.server.base_path,
        "Portico listening"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown signal handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}

fn run_init(output: &std::path::Path, force: bool) -> ExitCode {
    if output.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output.display()
        );
        return ExitCode::FAILURE;
    }

    if let Err(e) = std::fs::write(output, default_config_toml()) {
        eprintln!("Failed to write config file: {}", e);
        return ExitCode::FAILURE;
    }

    println!("Created config file: {}", output.display());
    println!();
    println!("To start the server, run:");
    println!("  portico serve --config {}", output.display());
    ExitCode::SUCCESS
}

/// Default configuration for zero-config startup.
fn default_config_toml() -> &'static str {
    r#"# Portico configuration

[server]
host = "127.0.0.1"
port = 8080
base_path = "/api/v1"

[auth]
api_key_header = "x-api-key"
user_key_prefix = "usr_"
org_key_prefix = "org_"

# Platform admin created on first start while the user store is empty.
# Inject the key via the environment rather than committing it.
# [auth.bootstrap]
# username = "root"
# email = "root@example.com"
# api_key = "${PORTICO_BOOTSTRAP_KEY}"

# The builtin permission table can be replaced wholesale:
# [[auth.permissions]]
# path = "/health"
# methods = ["GET"]
# public = true
"#
}
