use crate::config::Config;
use crate::screening::pipeline::Screener;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The screening pipeline with its document source and extraction service wired in.
    pub screener: Screener,
    pub config: Config,
}
