use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdash::api::router;
use taskdash::config::{AppConfig, Backend};
use taskdash::feed::{ChangeHub, IntervalFeed};
use taskdash::models::Session;
use taskdash::remote::{CollectionClient, MemoryCollectionClient, RestCollectionClient};
use taskdash::services::Dashboard;
use taskdash::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "taskdash=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let session = Session::new(config.user_id.clone(), config.access_token.clone());

    let hub = ChangeHub::new();
    let client: Arc<dyn CollectionClient> = match &config.backend {
        Backend::Rest(rest) => {
            info!("using backend at {}", rest.base_url);
            Arc::new(RestCollectionClient::new(rest.clone())?)
        }
        Backend::Memory => {
            info!("using in-memory backend");
            Arc::new(MemoryCollectionClient::new().with_hub(hub.clone()))
        }
    };

    let dashboard = Arc::new(Dashboard::new(session, client));
    dashboard.load().await;

    match (&config.backend, config.poll_interval) {
        (Backend::Memory, _) => dashboard.watch(&hub),
        (Backend::Rest(_), Some(interval)) => dashboard.watch(&IntervalFeed::new(interval)),
        (Backend::Rest(_), None) => info!("change feed disabled"),
    }

    let app = router(AppState::new(dashboard));

    info!("listening on http://{}", config.bind);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
