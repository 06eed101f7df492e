use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowmeet_api::app::build_router;
use flowmeet_api::config::Config;
use flowmeet_api::db::Database;
use flowmeet_api::db_storage::PgStore;
use flowmeet_api::enrichment::{EnrichmentProvider, HttpEnrichmentProvider};
use flowmeet_api::handlers::AppState;
use flowmeet_api::mailer;

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool (running migrations
/// unless disabled), the email and enrichment clients, then serves the router.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowmeet_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    if config.run_migrations {
        db.migrate().await?;
    }

    let mailer = mailer::from_config(&config)?;
    if config.resend_api_key.is_some() {
        tracing::info!("✓ Resend mailer initialized: {}", config.resend_base_url);
    } else {
        tracing::warn!("RESEND_API_KEY not set - emails will only be logged");
    }

    let enrichment = match HttpEnrichmentProvider::from_config(&config)? {
        Some(provider) => {
            tracing::info!("✓ Enrichment provider initialized");
            Some(Arc::new(provider) as Arc<dyn EnrichmentProvider>)
        }
        None => {
            tracing::info!("ENRICHMENT_BASE_URL not set - enrichment disabled");
            None
        }
    };

    // Build application state
    let app_state = Arc::new(AppState {
        store: Arc::new(PgStore::new(db.pool.clone())),
        mailer,
        enrichment,
        config: config.clone(),
    });

    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
