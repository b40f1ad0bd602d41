use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Stateless computation over a posted payload
        .route(
            "/compute/critical-path",
            post(handlers::compute_critical_path_stateless),
        )
        .route("/compute/matrix", post(handlers::compute_matrix_stateless::<S>))
        // Plan management
        .route("/plans", get(handlers::list_plans::<S>))
        .route("/plans", post(handlers::create_plan::<S>))
        .route("/plans/:plan_id", get(handlers::get_plan::<S>))
        .route("/plans/:plan_id", delete(handlers::delete_plan::<S>))
        .route("/plans/:plan_id/lanes", post(handlers::upsert_lane::<S>))
        .route(
            "/plans/:plan_id/lanes/:lane_id",
            delete(handlers::delete_lane::<S>),
        )
        .route("/plans/:plan_id/items", post(handlers::upsert_item::<S>))
        .route(
            "/plans/:plan_id/items/:item_id",
            delete(handlers::delete_item::<S>),
        )
        .route("/plans/:plan_id/relations", post(handlers::add_relation::<S>))
        .route(
            "/plans/:plan_id/relations/:relation_id",
            delete(handlers::delete_relation::<S>),
        )
        // Derived views
        .route("/plans/:plan_id/validate", get(handlers::validate_plan::<S>))
        .route(
            "/plans/:plan_id/critical-path",
            get(handlers::get_critical_path::<S>),
        )
        .route("/plans/:plan_id/matrix", get(handlers::get_matrix::<S>))
        .route("/plans/:plan_id/heatmap", get(handlers::get_heatmap::<S>))
        .route(
            "/plans/:plan_id/capacity",
            post(handlers::analyze_plan_capacity::<S>),
        )
}
