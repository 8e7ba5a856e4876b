use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jira_timebookings::config::Config;
use jira_timebookings::services::{init, jira::JiraService};
use jira_timebookings::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jira_timebookings=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Jira Timebookings companion service");

    // Initialize database
    let pool = init::init_db(&config).await?;

    // Initialize the Jira client
    let jira = JiraService::new().map_err(|e| anyhow::anyhow!("{}", e))?;

    let app_state = Arc::new(AppState {
        db: pool,
        config: config.clone(),
        jira,
    });

    // Create shutdown notifier for background workers
    let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);

    // Spawn background workers (returns JoinHandles so we can await shutdown)
    let bg_handles = init::spawn_background_workers(app_state.clone(), shutdown_tx.clone());

    // Build router
    let app = app(app_state);

    // Start server
    let host = config.server.host.clone();
    let port = config.server.port;
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server_fut = axum::serve(listener, app);

    let shutdown_tx_clone = shutdown_tx.clone();
    let signal_fut = async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut term =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("Failed to bind SIGTERM");
            tokio::select! {
                _ = ctrl_c => {},
                _ = term.recv() => {},
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("Failed to bind Ctrl+C");
        }

        tracing::info!("Shutdown signal received, notifying background workers");
        let _ = shutdown_tx_clone.send(());
    };

    tokio::select! {
        res = server_fut => {
            if let Err(e) = res {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = signal_fut => {
            tracing::info!("Signal handler completed; server future dropped to stop accepting new connections");
        }
    }

    // Give background workers some time to finish their work.
    let shutdown_wait = Duration::from_secs(10);
    let bg_wait = async {
        for h in bg_handles {
            let _ = h.await;
        }
    };
    let _ = tokio::time::timeout(shutdown_wait, bg_wait).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
