use std::net::SocketAddr;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use meeting_rooms::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env().expect("Invalid meeting room configuration");
    init_tracing(&config.log_level);

    tracing::info!(
        access_ttl_secs = config.access_token_ttl.num_seconds(),
        refresh_ttl_secs = config.refresh_token_ttl.num_seconds(),
        upload_dir = %config.upload_dir.display(),
        "Starting meeting room booking service"
    );

    // ServeDir answers 404 for everything until the directory exists
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to the booking database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate users, roles and meeting rooms");

    let addr = SocketAddr::new(config.host, config.port);
    let app = meeting_rooms::build_app(pool, config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Meeting room API on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Meeting room service stopped");
    Ok(())
}

/// `RUST_LOG` wins over `ROOMS_LOG_LEVEL`.
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Draining in-flight booking requests");
}
