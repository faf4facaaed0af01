pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, LogsCommands, UserCommands};
pub use config::Config;
use models::user::NewUser;
pub use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let Some(command) = cli.command else {
        return run_server(config, prometheus_handle).await;
    };

    match command {
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config, prometheus_handle).await
        }

        Commands::Init => cli::cmd_init(&config).await,

        Commands::Migrate { command } => cli::cmd_migrate(&config, command).await,

        Commands::User { command } => match command {
            UserCommands::Add {
                username,
                email,
                first_name,
                last_name,
                password,
                role,
            } => {
                let new_user = NewUser {
                    first_name,
                    last_name,
                    username,
                    email,
                    password: String::new(),
                    role: Some(role),
                };
                cli::cmd_user_add(&config, new_user, password).await
            }
            UserCommands::List => cli::cmd_user_list(&config).await,
            UserCommands::Passwd { username, password } => {
                cli::cmd_user_passwd(&config, &username, password).await
            }
            UserCommands::Role { username, role } => {
                cli::cmd_user_role(&config, &username, role).await
            }
        },

        Commands::Closet { username } => cli::cmd_closet(&config, &username).await,

        Commands::Logs { command } => match command {
            LogsCommands::List {
                admin,
                page,
                page_size,
                action_type,
                user,
            } => {
                cli::cmd_logs_list(&config, &admin, page, page_size, action_type, user.as_deref())
                    .await
            }
            LogsCommands::Export { admin, output } => {
                cli::cmd_logs_export(&config, &admin, output.as_deref()).await
            }
            LogsCommands::Prune {
                admin,
                older_than_days,
            } => cli::cmd_logs_prune(&config, &admin, older_than_days).await,
        },
    }
}

/// `RUST_LOG` wins over `general.log_level`.
fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Closet v{} starting...", env!("CARGO_PKG_VERSION"));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let shared = Arc::new(SharedState::new(config).await?);
    let app = api::router(api::create_app_state(shared, prometheus_handle));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
