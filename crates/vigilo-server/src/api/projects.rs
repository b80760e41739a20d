use crate::api::{error_response, success_response};
use crate::error::RuleError;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    name: String,
}

pub async fn create_project(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(e) => return error_response(&trace_id, &RuleError::BadRequest(e.body_text())),
    };
    match state.rules.create_project(&req.name).await {
        Ok(project) => success_response(StatusCode::CREATED, &trace_id, project),
        Err(e) => error_response(&trace_id, &e),
    }
}

/// Lists a project's rules, each annotated with its metric count.
pub async fn list_project_rules(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Response {
    let Ok(project_id) = project_id.parse::<i64>() else {
        return error_response(&trace_id, &RuleError::InvalidProjectId);
    };
    match state.rules.list_project(project_id).await {
        Ok(views) => success_response(StatusCode::OK, &trace_id, views),
        Err(e) => error_response(&trace_id, &e),
    }
}
