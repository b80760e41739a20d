pub mod projects;
pub mod rules;

use crate::error::RuleError;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// Uniform response envelope.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// 0 on success
    pub err_code: i32,
    pub err_msg: String,
    pub trace_id: String,
    pub data: Option<T>,
}

#[derive(Serialize)]
pub struct IdResponse {
    pub id: i64,
}

pub fn success_response<T>(status: StatusCode, trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: 0,
            err_msg: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

fn to_custom_error_code(err: &RuleError) -> i32 {
    match err {
        RuleError::BadRequest(_) => 1001,
        RuleError::InvalidPattern(_) => 1101,
        RuleError::InvalidLevel(_) => 1102,
        RuleError::MissingComment => 1103,
        RuleError::NoCondition => 1104,
        RuleError::InvalidProjectId => 1105,
        RuleError::RequiredFieldMissing => 1106,
        RuleError::ProjectNotFound => 1201,
        RuleError::RuleNotFound => 1202,
        RuleError::DuplicatePattern => 1301,
        RuleError::DuplicateProjectName => 1302,
        RuleError::PrimaryKeyConflict => 1303,
        RuleError::UpdateFailed(_) => 1501,
        RuleError::Unexpected(_) => 1500,
    }
}

pub fn status_of(err: &RuleError) -> StatusCode {
    match err {
        RuleError::BadRequest(_)
        | RuleError::InvalidPattern(_)
        | RuleError::InvalidLevel(_)
        | RuleError::MissingComment
        | RuleError::NoCondition
        | RuleError::InvalidProjectId
        | RuleError::RequiredFieldMissing => StatusCode::BAD_REQUEST,
        RuleError::ProjectNotFound | RuleError::RuleNotFound => StatusCode::NOT_FOUND,
        RuleError::DuplicatePattern
        | RuleError::DuplicateProjectName
        | RuleError::PrimaryKeyConflict => StatusCode::CONFLICT,
        RuleError::UpdateFailed(_) | RuleError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(trace_id: &str, err: &RuleError) -> Response {
    let status = status_of(err);
    if status.is_server_error() {
        let cause = std::error::Error::source(err).map(ToString::to_string);
        tracing::error!(trace_id, code = err.code(), cause = ?cause, "Rule operation failed");
    }
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: to_custom_error_code(err),
            err_msg: err.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    version: String,
    uptime_secs: i64,
    cached_rules: usize,
    index_timeout_ms: u64,
}

async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    success_response(
        StatusCode::OK,
        &trace_id,
        HealthResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: (Utc::now() - state.start_time).num_seconds(),
            cached_rules: state.rules.cache().len(),
            index_timeout_ms: state.config.index.timeout_ms,
        },
    )
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/projects", post(projects::create_project))
        .route(
            "/v1/projects/{id}/rules",
            get(projects::list_project_rules).post(rules::create_rule),
        )
        .route(
            "/v1/rules/{id}",
            get(rules::get_rule)
                .patch(rules::edit_rule)
                .delete(rules::delete_rule),
        )
}
