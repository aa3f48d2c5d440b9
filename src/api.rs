// 🌐 REST API - axum router over the two trackers
//
// One mutex guards store + trackers so every command sees a consistent view.
// Handlers never hold the lock across an await.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

use crate::error::SavingsError;
use crate::fund_tracker::FundTracker;
use crate::funds::{self, FundDeposit, FundState, WEEKLY_THRESHOLD};
use crate::goal_tracker::GoalTracker;
use crate::goals::{Goal, GoalDeposit, Priority};
use crate::render::{self, ChartSlice, ProgressBar};
use crate::store::{Event, KeyValueStore, SqliteStore};

const ACTOR: &str = "api";
const DEFAULT_EVENT_LIMIT: usize = 50;
const MAX_EVENT_LIMIT: usize = 500;

/// Store plus both trackers, loaded once at startup
pub struct AppState {
    pub store: SqliteStore,
    pub funds: FundTracker,
    pub goals: GoalTracker,
}

pub type SharedState = Arc<Mutex<AppState>>;

impl AppState {
    pub fn load(store: SqliteStore) -> Result<Self, SavingsError> {
        let funds = FundTracker::load(&store)?.with_actor(ACTOR);
        let goals = GoalTracker::load(&store)?.with_actor(ACTOR);
        Ok(Self { store, funds, goals })
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }
}

// ============================================================================
// ENVELOPE
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<SavingsError> for ApiError {
    fn from(err: SavingsError) -> Self {
        let status = match &err {
            SavingsError::InvalidAmount { .. } | SavingsError::MissingRequiredField { .. } => {
                StatusCode::BAD_REQUEST
            }
            SavingsError::GoalNotFound { .. } => StatusCode::NOT_FOUND,
            SavingsError::EmptyGoalList
            | SavingsError::DuplicateSaveToday
            | SavingsError::ExceedsTotalSavings { .. } => StatusCode::CONFLICT,
            SavingsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if err.is_storage() {
            eprintln!("❌ {}", err);
        }

        ApiError {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
            code: Some(self.code),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>, ApiError> {
    state
        .lock()
        .map_err(|_| SavingsError::Storage("state lock poisoned".to_string()).into())
}

/// Amounts arrive as JSON strings or numbers; both go through the same parser
fn raw_input(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// REQUEST / RESPONSE BODIES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: Value,
}

#[derive(Debug, Deserialize)]
pub struct NewGoalRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target: Value,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FundsView {
    pub funds: FundState,
    pub total: f64,
    pub last_saved: Option<String>,
    pub saved_today: bool,
    pub weekly: ProgressBar,
    pub slices: Vec<ChartSlice>,
}

#[derive(Debug, Serialize)]
pub struct GoalsView {
    pub total: u64,
    pub goals: Vec<Goal>,
}

#[derive(Debug, Serialize)]
pub struct GoalProgressView {
    pub id: String,
    pub name: String,
    pub color: &'static str,
    pub progress: ProgressBar,
    pub percent: u16,
}

#[derive(Debug, Serialize)]
pub struct GoalChartView {
    pub total: u64,
    pub slices: Vec<ChartSlice>,
    pub progress: Vec<GoalProgressView>,
}

fn funds_view(tracker: &FundTracker) -> FundsView {
    let state = tracker.funds();
    FundsView {
        funds: state,
        total: state.total(),
        last_saved: tracker.last_saved().map(funds::format_day),
        saved_today: tracker.has_saved_on(Local::now().date_naive()),
        weekly: ProgressBar {
            current: state.weekly,
            target: WEEKLY_THRESHOLD,
        },
        slices: render::fund_slices(&state),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/funds
async fn get_funds(State(state): State<SharedState>) -> ApiResult<FundsView> {
    let app = lock(&state)?;
    Ok(Json(ApiResponse::ok(funds_view(&app.funds))))
}

/// POST /api/funds/deposit - once per calendar day
async fn deposit_funds(
    State(state): State<SharedState>,
    Json(req): Json<AmountRequest>,
) -> ApiResult<FundDeposit> {
    let mut guard = lock(&state)?;
    let app = &mut *guard;

    let outcome = app
        .funds
        .save(&mut app.store, &raw_input(&req.amount), Local::now().date_naive())?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/goals
async fn list_goals(State(state): State<SharedState>) -> ApiResult<GoalsView> {
    let app = lock(&state)?;
    Ok(Json(ApiResponse::ok(GoalsView {
        total: app.goals.total(),
        goals: app.goals.goals().to_vec(),
    })))
}

/// POST /api/goals - priority defaults to Medium
async fn create_goal(
    State(state): State<SharedState>,
    Json(req): Json<NewGoalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Goal>>), ApiError> {
    let priority = match req.priority.as_deref() {
        Some(p) => p.parse::<Priority>().map_err(|message| ApiError {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_priority",
            message,
        })?,
        None => Priority::default(),
    };

    let mut guard = lock(&state)?;
    let app = &mut *guard;

    let goal = app
        .goals
        .add_goal(&mut app.store, &req.name, &raw_input(&req.target), priority)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(goal))))
}

/// POST /api/goals/deposit - split across goals by priority weight
async fn deposit_goals(
    State(state): State<SharedState>,
    Json(req): Json<AmountRequest>,
) -> ApiResult<GoalDeposit> {
    let mut guard = lock(&state)?;
    let app = &mut *guard;

    let outcome = app.goals.deposit(&mut app.store, &raw_input(&req.amount))?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// PUT /api/goals/:id/amount - returns the whole rebalanced list
async fn edit_goal_amount(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> ApiResult<GoalsView> {
    let mut guard = lock(&state)?;
    let app = &mut *guard;

    app.goals.edit_amount(&mut app.store, &id, &raw_input(&req.amount))?;
    Ok(Json(ApiResponse::ok(GoalsView {
        total: app.goals.total(),
        goals: app.goals.goals().to_vec(),
    })))
}

/// POST /api/goals/:id/reset
async fn reset_goal(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Goal> {
    let mut guard = lock(&state)?;
    let app = &mut *guard;

    app.goals.reset(&mut app.store, &id)?;
    let goal = app
        .goals
        .get(&id)
        .cloned()
        .ok_or(SavingsError::GoalNotFound { id })?;
    Ok(Json(ApiResponse::ok(goal)))
}

/// DELETE /api/goals/:id - the client confirms before calling
async fn delete_goal(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Goal> {
    let mut guard = lock(&state)?;
    let app = &mut *guard;

    let removed = app.goals.delete(&mut app.store, &id)?;
    Ok(Json(ApiResponse::ok(removed)))
}

/// GET /api/goals/chart - slices and progress bars for a front end
async fn goal_chart(State(state): State<SharedState>) -> ApiResult<GoalChartView> {
    let app = lock(&state)?;
    let goals = app.goals.goals();

    let progress = goals
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let bar = render::goal_progress(g);
            GoalProgressView {
                id: g.id.clone(),
                name: g.name.clone(),
                color: render::goal_color(g.priority, i),
                progress: bar,
                percent: bar.percent(),
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(GoalChartView {
        total: app.goals.total(),
        slices: render::goal_slices(goals),
        progress,
    })))
}

/// GET /api/events?limit=N - newest first
async fn list_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Vec<Event>> {
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT).min(MAX_EVENT_LIMIT);
    let app = lock(&state)?;
    let events = app.store.recent_events(limit).map_err(SavingsError::from)?;
    Ok(Json(ApiResponse::ok(events)))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(state: SharedState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/funds", get(get_funds))
        .route("/funds/deposit", post(deposit_funds))
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/deposit", post(deposit_goals))
        .route("/goals/chart", get(goal_chart))
        .route("/goals/:id", axum::routing::delete(delete_goal))
        .route("/goals/:id/amount", put(edit_goal_amount))
        .route("/goals/:id/reset", post(reset_goal))
        .route("/events", get(list_events))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        let store = SqliteStore::open_in_memory().unwrap();
        AppState::load(store).unwrap().shared()
    }

    async fn call(state: &SharedState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn add(state: &SharedState, name: &str, priority: &str) -> String {
        let (status, body) = call(
            state,
            "POST",
            "/api/goals",
            Some(serde_json::json!({ "name": name, "target": 1000, "priority": priority })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state();
        let (status, body) = call(&state, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_fund_deposit_then_duplicate() {
        let state = test_state();

        let (status, body) = call(&state, "POST", "/api/funds/deposit", Some(serde_json::json!({ "amount": "110" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["split"]["gym"], 45.0);
        assert_eq!(body["data"]["weekly_goal_reached"], false);

        let (status, body) = call(&state, "POST", "/api/funds/deposit", Some(serde_json::json!({ "amount": 5 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "duplicate_save_today");

        let (_, body) = call(&state, "GET", "/api/funds", None).await;
        assert_eq!(body["data"]["saved_today"], true);
        assert_eq!(body["data"]["total"], 110.0);
    }

    #[tokio::test]
    async fn test_invalid_amount_is_bad_request() {
        let state = test_state();
        let (status, body) = call(&state, "POST", "/api/funds/deposit", Some(serde_json::json!({ "amount": "abc" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_amount");
    }

    #[tokio::test]
    async fn test_goal_deposit_split_by_priority() {
        let state = test_state();
        let high = add(&state, "Laptop", "High").await;
        add(&state, "Trip", "Medium").await;

        let (status, body) = call(&state, "POST", "/api/goals/deposit", Some(serde_json::json!({ "amount": 100 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["goals"][0]["id"], high.as_str());
        assert_eq!(body["data"]["goals"][0]["amount"], 60);
        assert_eq!(body["data"]["goals"][1]["amount"], 40);

        let (_, body) = call(&state, "GET", "/api/goals", None).await;
        assert_eq!(body["data"]["total"], 100);
    }

    #[tokio::test]
    async fn test_deposit_without_goals_conflicts() {
        let state = test_state();
        let (status, body) = call(&state, "POST", "/api/goals/deposit", Some(serde_json::json!({ "amount": 100 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "empty_goal_list");
    }

    #[tokio::test]
    async fn test_create_goal_validation() {
        let state = test_state();

        let (status, body) = call(&state, "POST", "/api/goals", Some(serde_json::json!({ "name": "", "target": 10 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "missing_required_field");

        let (status, body) = call(
            &state,
            "POST",
            "/api/goals",
            Some(serde_json::json!({ "name": "A", "target": 10, "priority": "urgent" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_priority");

        let (status, body) = call(&state, "POST", "/api/goals", Some(serde_json::json!({ "name": "A", "target": "10" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["priority"], "Medium");
    }

    #[tokio::test]
    async fn test_edit_reset_delete() {
        let state = test_state();
        let a = add(&state, "A", "High").await;
        let b = add(&state, "B", "Medium").await;
        call(&state, "POST", "/api/goals/deposit", Some(serde_json::json!({ "amount": 100 }))).await;

        let uri = format!("/api/goals/{}/amount", a);
        let (status, body) = call(&state, "PUT", &uri, Some(serde_json::json!({ "amount": 20 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["goals"][0]["amount"], 20);
        assert_eq!(body["data"]["goals"][1]["amount"], 80);

        let (status, body) = call(&state, "PUT", &uri, Some(serde_json::json!({ "amount": 500 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "exceeds_total_savings");

        let (status, body) = call(&state, "POST", &format!("/api/goals/{}/reset", b), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["amount"], 0);

        let (status, _) = call(&state, "DELETE", &format!("/api/goals/{}", a), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&state, "DELETE", &format!("/api/goals/{}", a), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "goal_not_found");
    }

    #[tokio::test]
    async fn test_chart_and_events() {
        let state = test_state();
        add(&state, "A", "High").await;
        add(&state, "B", "Low").await;
        call(&state, "POST", "/api/goals/deposit", Some(serde_json::json!({ "amount": 40 }))).await;

        let (_, body) = call(&state, "GET", "/api/goals/chart", None).await;
        assert_eq!(body["data"]["total"], 40);
        assert_eq!(body["data"]["slices"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["progress"][0]["percent"], 3);
        assert_eq!(body["data"]["progress"][0]["color"], render::HIGH_COLORS[0]);

        let (status, body) = call(&state, "GET", "/api/events?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let events = body["data"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event_type"], "goal_deposit");
    }
}
