//! # Tessera Server
//!
//! Binary entry point: loads configuration, connects the credential store
//! (PostgreSQL, or an in-memory store when no database is configured) and
//! serves the HTTP API until Ctrl-C or SIGTERM.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tessera_core::{
    MIGRATOR,
    database::{
        InMemoryUsersRepository, PostgresUsersRepository,
        ports::users::UsersRepository,
    },
};
use tessera_server::{AppState, infra::config::Config, routes};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "tessera-server")]
#[command(about = "Account backend with token-gated profile reads and updates")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// PostgreSQL connection string (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Loads `.env` first so RUST_LOG from the file is honored.
    let config = load_config(&cli.serve)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                |_| "tessera_server=info,tessera_core=info,tower_http=info".into(),
            ),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        return run_db_migrate(&config).await;
    }

    run_server(config).await
}

fn load_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut config = Config::from_env().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server_host = host;
    }
    if let Some(url) = args.database_url.clone() {
        config.database_url = Some(url);
    }

    Ok(config)
}

async fn connect_postgres(database_url: &str) -> anyhow::Result<sqlx::PgPool> {
    if !(database_url.starts_with("postgres://")
        || database_url.starts_with("postgresql://"))
    {
        anyhow::bail!(
            "Invalid database URL: must start with postgres:// or postgresql://"
        );
    }

    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to run migrations")?;
    let pool = connect_postgres(database_url).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    config.ensure_directories()?;
    if config.uses_default_secrets() {
        warn!("AUTH_TOKEN_SECRET or AUTH_PASSWORD_PEPPER not set - using insecure defaults");
    }

    let users: Arc<dyn UsersRepository> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = connect_postgres(url).await?;
            MIGRATOR
                .run(&pool)
                .await
                .context("database migration failed")?;
            info!("Connected to PostgreSQL and applied migrations");
            Arc::new(PostgresUsersRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set - accounts are kept in memory and lost on restart");
            Arc::new(InMemoryUsersRepository::new())
        }
    };

    let config = Arc::new(config);
    let state = AppState::build(config.clone(), users)?;
    let app = routes::create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server_host, config.server_port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        uploads = %config.uploads_dir.display(),
        "Tessera server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
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
    info!("Shutdown signal received");
}
