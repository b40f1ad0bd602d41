use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::PlanError;
use crate::logic::{
    analyze_capacity, build_heatmap, compute_matrix, CriticalPathResolver, CriticalPathResult,
    PlanValidationResult, PlanValidator, RelationValidator, ValidationIssue,
};
use crate::model::{
    CapacityReport, CapacityRequest, HeatmapEntry, Id, Lane, MatrixData, NewPlan, Plan,
    PlanSummary, Relation, ScheduledItem,
};
use crate::store::traits::Store;

pub struct AppState<S> {
    pub store: Arc<S>,
    pub engine: Arc<EngineConfig>,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, engine: EngineConfig) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            engine: self.engine.clone(),
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

fn plan_error(e: PlanError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        PlanError::DuplicateRelation { .. } => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ErrorResponse::new(&e.to_string())))
}

async fn load_plan<S: Store>(store: &S, plan_id: &Id) -> ApiResult<Plan> {
    store
        .get_plan(plan_id)
        .await
        .map_err(plan_error)?
        .ok_or_else(|| plan_error(PlanError::PlanNotFound(plan_id.clone())))
}

/// Request body for the stateless critical path endpoint
#[derive(Debug, Deserialize)]
pub struct CriticalPathRequest {
    #[serde(default)]
    pub items: Vec<ScheduledItem>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Resolver result plus whatever the relation check stripped beforehand
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathResponse {
    #[serde(flatten)]
    pub result: CriticalPathResult,
    pub issues: Vec<ValidationIssue>,
}

fn resolve_critical_path(items: &[ScheduledItem], relations: &[Relation]) -> CriticalPathResponse {
    let validation = RelationValidator::validate(items, relations);
    CriticalPathResponse {
        result: CriticalPathResolver::resolve(items, &validation.relations),
        issues: validation.issues,
    }
}

pub async fn compute_critical_path_stateless(
    RequestJson(request): RequestJson<CriticalPathRequest>,
) -> Json<CriticalPathResponse> {
    Json(resolve_critical_path(&request.items, &request.relations))
}

/// The flat cell map cannot carry two pairs under one key; refuse such a matrix up front
fn matrix_response(matrix: MatrixData) -> ApiResult<Json<MatrixData>> {
    match matrix.ambiguous_key() {
        Some(key) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(&format!(
                "Cell key '{}' matches more than one lane/checkpoint pair",
                key
            ))),
        )),
        None => Ok(Json(matrix)),
    }
}

pub async fn compute_matrix_stateless<S: Store>(
    State(state): State<AppState<S>>,
    RequestJson(plan): RequestJson<Plan>,
) -> ApiResult<Json<MatrixData>> {
    matrix_response(compute_matrix(&plan, &state.engine.matrix))
}

pub async fn list_plans<S: Store>(
    State(state): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<PlanSummary>>> {
    let plans = state.store.list_plans().await.map_err(plan_error)?;
    let items: Vec<PlanSummary> = plans.iter().map(PlanSummary::from).collect();
    Ok(Json(ListResponse {
        total: items.len(),
        items,
    }))
}

pub async fn create_plan<S: Store>(
    State(state): State<AppState<S>>,
    RequestJson(new_plan): RequestJson<NewPlan>,
) -> ApiResult<(StatusCode, Json<Plan>)> {
    let plan = state.store.create_plan(new_plan).await.map_err(plan_error)?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn get_plan<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
) -> ApiResult<Json<Plan>> {
    Ok(Json(load_plan(&*state.store, &plan_id).await?))
}

pub async fn delete_plan<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
) -> ApiResult<StatusCode> {
    match state.store.delete_plan(&plan_id).await.map_err(plan_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(plan_error(PlanError::PlanNotFound(plan_id))),
    }
}

pub async fn upsert_lane<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
    RequestJson(lane): RequestJson<Lane>,
) -> ApiResult<Json<Lane>> {
    let lane = state
        .store
        .upsert_lane(&plan_id, lane)
        .await
        .map_err(plan_error)?;
    Ok(Json(lane))
}

pub async fn delete_lane<S: Store>(
    State(state): State<AppState<S>>,
    Path((plan_id, lane_id)): Path<(Id, Id)>,
) -> ApiResult<StatusCode> {
    match state
        .store
        .delete_lane(&plan_id, &lane_id)
        .await
        .map_err(plan_error)?
    {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(plan_error(PlanError::LaneNotFound(lane_id))),
    }
}

pub async fn upsert_item<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
    RequestJson(item): RequestJson<ScheduledItem>,
) -> ApiResult<Json<ScheduledItem>> {
    let item = state
        .store
        .upsert_item(&plan_id, item)
        .await
        .map_err(plan_error)?;
    Ok(Json(item))
}

pub async fn delete_item<S: Store>(
    State(state): State<AppState<S>>,
    Path((plan_id, item_id)): Path<(Id, Id)>,
) -> ApiResult<StatusCode> {
    match state
        .store
        .delete_item(&plan_id, &item_id)
        .await
        .map_err(plan_error)?
    {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(plan_error(PlanError::ItemNotFound(item_id))),
    }
}

pub async fn add_relation<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
    RequestJson(relation): RequestJson<Relation>,
) -> ApiResult<(StatusCode, Json<Relation>)> {
    let relation = state
        .store
        .add_relation(&plan_id, relation)
        .await
        .map_err(plan_error)?;
    Ok((StatusCode::CREATED, Json(relation)))
}

pub async fn delete_relation<S: Store>(
    State(state): State<AppState<S>>,
    Path((plan_id, relation_id)): Path<(Id, Id)>,
) -> ApiResult<StatusCode> {
    match state
        .store
        .delete_relation(&plan_id, &relation_id)
        .await
        .map_err(plan_error)?
    {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(plan_error(PlanError::RelationNotFound(relation_id))),
    }
}

pub async fn validate_plan<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
) -> ApiResult<Json<PlanValidationResult>> {
    let plan = load_plan(&*state.store, &plan_id).await?;
    Ok(Json(PlanValidator::validate(&plan)))
}

pub async fn get_critical_path<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
) -> ApiResult<Json<CriticalPathResponse>> {
    let plan = load_plan(&*state.store, &plan_id).await?;
    Ok(Json(resolve_critical_path(&plan.items, &plan.relations)))
}

pub async fn get_matrix<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
) -> ApiResult<Json<MatrixData>> {
    let plan = load_plan(&*state.store, &plan_id).await?;
    matrix_response(compute_matrix(&plan, &state.engine.matrix))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapResponse {
    pub plan_id: Id,
    pub entries: Vec<HeatmapEntry>,
}

pub async fn get_heatmap<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
) -> ApiResult<Json<HeatmapResponse>> {
    let plan = load_plan(&*state.store, &plan_id).await?;
    let matrix = compute_matrix(&plan, &state.engine.matrix);
    Ok(Json(HeatmapResponse {
        plan_id,
        entries: build_heatmap(&matrix, &state.engine.heat),
    }))
}

pub async fn analyze_plan_capacity<S: Store>(
    State(state): State<AppState<S>>,
    Path(plan_id): Path<Id>,
    RequestJson(request): RequestJson<CapacityRequest>,
) -> ApiResult<Json<CapacityReport>> {
    if request.window.end < request.window.start {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Capacity window ends before it starts")),
        ));
    }
    let plan = load_plan(&*state.store, &plan_id).await?;
    Ok(Json(analyze_capacity(
        &plan,
        &request,
        &state.engine.capacity,
        &state.engine.matrix.effort,
    )))
}
