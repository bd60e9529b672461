//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{InMemoryRecordStore, OpenAiReportAdapter, RedisRecordStore},
    config::{Config, StoreBackend},
    error::ApiError,
    web::{self, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use life_script_core::{
    ports::{RecordStore, ReportGenerationService},
    RecordLifecycle,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Set Up the Record Store ---
    let store: Option<Arc<dyn RecordStore>> = match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory record store; records are lost on restart.");
            Some(Arc::new(InMemoryRecordStore::new()))
        }
        StoreBackend::Redis => match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                let store = RedisRecordStore::new(client);
                match store.ping().await {
                    Ok(()) => info!("Connected to Redis."),
                    Err(e) => warn!("Redis is not reachable yet: {}", e),
                }
                Some(Arc::new(store))
            }
            None => {
                warn!("REDIS_URL is not set; the records API will answer 500.");
                None
            }
        },
    };

    // --- 3. Initialize the Report Adapter ---
    let report: Option<Arc<dyn ReportGenerationService>> = match &config.llm_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new()
                .with_api_base(config.llm_api_base.clone())
                .with_api_key(api_key.clone());
            Some(Arc::new(OpenAiReportAdapter::new(
                Client::with_config(openai_config),
                config.report_model.clone(),
                config.report_temperature,
            )))
        }
        None => {
            warn!("DEEPSEEK_API_KEY is not set; the report API will answer 500.");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        records: store.map(RecordLifecycle::new),
        report,
    });

    // --- 5. Create the Web Router ---
    let app = web::router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
