pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::PlanError;

// Export the engines
pub use logic::{
    analyze_capacity, build_heatmap, classify_heat, compute_critical_path, compute_matrix,
    CapacityAnalyzer, CriticalPathResolver, CriticalPathResult, EffortEstimator, MatrixEngine,
    PlanValidationResult, PlanValidator, RelationValidationResult, RelationValidator,
    ValidationIssue, ValidationIssueType,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, Store};

/// Serve the API on the configured address with an empty in-memory store
pub async fn run_server(config: crate::config::AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    let store = Arc::new(MemoryStore::new());
    let state = crate::api::handlers::AppState::new(store, config.engine.clone());
    let app = crate::api::routes::create_router().with_state(state);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Timeline engine listening on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
