use crate::api::{error_response, success_response, IdResponse};
use crate::error::RuleError;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use vigilo_common::types::RuleFields;

fn parse_rule_id(raw: &str) -> Result<i64, RuleError> {
    raw.parse()
        .map_err(|_| RuleError::BadRequest(format!("invalid rule id '{raw}'")))
}

fn bind_fields(body: Result<Json<RuleFields>, JsonRejection>) -> Result<RuleFields, RuleError> {
    body.map(|Json(fields)| fields)
        .map_err(|e| RuleError::BadRequest(e.body_text()))
}

/// Creates a rule under a project.
pub async fn create_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    body: Result<Json<RuleFields>, JsonRejection>,
) -> Response {
    let Ok(project_id) = project_id.parse::<i64>() else {
        return error_response(&trace_id, &RuleError::InvalidProjectId);
    };
    let fields = match bind_fields(body) {
        Ok(fields) => fields,
        Err(e) => return error_response(&trace_id, &e),
    };
    match state.rules.create(project_id, &fields).await {
        Ok(view) => success_response(StatusCode::OK, &trace_id, view),
        Err(e) => error_response(&trace_id, &e),
    }
}

pub async fn get_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_rule_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(&trace_id, &e),
    };
    match state.rules.get(id).await {
        Ok(view) => success_response(StatusCode::OK, &trace_id, view),
        Err(e) => error_response(&trace_id, &e),
    }
}

/// Replaces every editable field of a rule.
pub async fn edit_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RuleFields>, JsonRejection>,
) -> Response {
    let id = match parse_rule_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(&trace_id, &e),
    };
    let fields = match bind_fields(body) {
        Ok(fields) => fields,
        Err(e) => return error_response(&trace_id, &e),
    };
    match state.rules.edit(id, &fields).await {
        Ok(view) => success_response(StatusCode::OK, &trace_id, view),
        Err(e) => error_response(&trace_id, &e),
    }
}

pub async fn delete_rule(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_rule_id(&id) {
        Ok(id) => id,
        Err(e) => return error_response(&trace_id, &e),
    };
    match state.rules.delete(id).await {
        Ok(()) => success_response(StatusCode::OK, &trace_id, IdResponse { id }),
        Err(e) => error_response(&trace_id, &e),
    }
}
