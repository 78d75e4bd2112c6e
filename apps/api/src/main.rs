mod config;
mod documents;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::documents::FsDocumentSource;
use crate::extraction::{
    fallback::FALLBACK_VOCABULARY_VERSION, DisabledExtractionService, ExtractionService,
    Extractor, LlmExtractionService,
};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::pipeline::Screener;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize extraction: LLM first, or rules only when disabled
    let service: Arc<dyn ExtractionService> = match &config.anthropic_api_key {
        Some(api_key) => {
            let mut llm =
                LlmClient::new(api_key.clone(), config.llm_timeout, config.llm_retry_delay)?;
            if let Some(endpoint) = &config.llm_endpoint {
                llm = llm.with_endpoint(endpoint.clone());
            }
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmExtractionService::new(llm))
        }
        None => {
            info!("LLM disabled; all extraction uses the rule-based fallback");
            Arc::new(DisabledExtractionService)
        }
    };
    info!("Fallback vocabulary v{FALLBACK_VOCABULARY_VERSION}");
    match &config.document_root {
        Some(root) => info!("Path screening enabled under {}", root.display()),
        None => info!("DOCUMENT_ROOT not set; only uploads can be screened"),
    }

    let screener = Screener::new(Arc::new(FsDocumentSource), Extractor::new(service));

    // Build app state
    let state = AppState {
        screener,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
