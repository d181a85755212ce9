use crate::task::{NewTask, Task, TaskService, TaskState};
use crate::web::api::v1::{ApiError, ErrorResponse};
use axum::{
    Router,
    extract::{Query, State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: String,
    /// Due date as YYYYMMDD
    date: String,
    title: String,
    comment: String,
    /// Repeat rule, empty for one-off tasks
    repeat: String,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id().to_string(),
            date: task.date().to_string(),
            title: task.title().to_string(),
            comment: task.comment().to_string(),
            repeat: task.repeat().to_string(),
        }
    }
}

/// JSON payload for creating a task.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TaskPayload {
    /// Due date as YYYYMMDD, today when empty
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    /// Repeat rule: `y`, `d N`, `w D,...` or `m D,... [M,...]`
    #[serde(default)]
    repeat: Option<String>,
}

impl From<TaskPayload> for NewTask {
    fn from(payload: TaskPayload) -> Self {
        NewTask {
            date: payload.date.unwrap_or_default(),
            title: payload.title.unwrap_or_default(),
            comment: payload.comment.unwrap_or_default(),
            repeat: payload.repeat.unwrap_or_default(),
        }
    }
}

/// JSON payload for updating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    task: TaskPayload,
}

/// API response carrying the ID of a created task.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdResponse {
    id: String,
}

/// API response for listing tasks.
#[derive(Debug, Serialize, ToSchema)]
pub struct TasksResponse {
    tasks: Vec<TaskJson>,
}

/// Empty JSON object returned by endpoints without a payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmptyResponse {}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    #[serde(default)]
    search: Option<String>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Reads a task ID; a missing ID is a bad request, an unknown one is not found.
fn parse_task_id(id: Option<&str>) -> Result<u32, ApiError> {
    let id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("id parameter is required".to_string()))?;
    id.parse()
        .map_err(|_| ApiError::NotFound(format!("Task with ID {id} not found")))
}

fn invalid_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(format!("Invalid JSON: {}", rejection.body_text()))
}

/// Handler for POST /api/task - Creates a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/task",
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Task created", body = IdResponse),
        (status = 400, description = "Missing title, malformed date or invalid rule", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<IdResponse>, ApiError> {
    let Json(payload) = payload.map_err(invalid_json)?;
    let service = TaskService::new(state.store.as_ref());
    let id = service.add_task(today(), payload.into()).await?;
    Ok(Json(IdResponse { id: id.to_string() }))
}

/// Handler for GET /api/task - Returns one task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/task",
    params(
        ("id" = String, Query, description = "ID of the task")
    ),
    responses(
        (status = 200, description = "Successfully retrieved task", body = TaskJson),
        (status = 400, description = "Missing id", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = parse_task_id(query.id.as_deref())?;
    let service = TaskService::new(state.store.as_ref());
    let task = service.get_task(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PUT /api/task - Replaces a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/task",
    request_body = UpdateTaskPayload,
    responses(
        (status = 200, description = "Task updated", body = EmptyResponse),
        (status = 400, description = "Missing id or title, malformed date or invalid rule", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<UpdateTaskPayload>, JsonRejection>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let Json(payload) = payload.map_err(invalid_json)?;
    let id = parse_task_id(payload.id.as_deref())?;
    let service = TaskService::new(state.store.as_ref());
    service.update_task(today(), id, payload.task.into()).await?;
    Ok(Json(EmptyResponse {}))
}

/// Handler for DELETE /api/task - Deletes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/task",
    params(
        ("id" = String, Query, description = "ID of the task")
    ),
    responses(
        (status = 200, description = "Task deleted", body = EmptyResponse),
        (status = 400, description = "Missing id", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let id = parse_task_id(query.id.as_deref())?;
    let service = TaskService::new(state.store.as_ref());
    service.delete_task(id).await?;
    Ok(Json(EmptyResponse {}))
}

/// Handler for POST /api/task/done - Completes a task.
///
/// One-off tasks are deleted, recurring tasks move to their next date.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/task/done",
    params(
        ("id" = String, Query, description = "ID of the task")
    ),
    responses(
        (status = 200, description = "Task completed", body = EmptyResponse),
        (status = 400, description = "Missing id or invalid stored rule", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn complete_task_handler(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let id = parse_task_id(query.id.as_deref())?;
    let service = TaskService::new(state.store.as_ref());
    service.complete_task(today(), id).await?;
    Ok(Json(EmptyResponse {}))
}

/// Handler for GET /api/tasks - Lists upcoming tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(
        ("search" = Option<String>, Query, description = "Text to look for in title or comment, or a date as DD.MM.YYYY")
    ),
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = TasksResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<TasksQuery>,
) -> Result<Json<TasksResponse>, ApiError> {
    let service = TaskService::new(state.store.as_ref());
    let tasks = service
        .list_tasks(query.search.as_deref(), state.tasks_limit)
        .await?;
    Ok(Json(TasksResponse {
        tasks: tasks.into_iter().map(TaskJson::from).collect(),
    }))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route(
            "/task",
            post(create_task_handler)
                .get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/task/done", post(complete_task_handler))
        .route("/tasks", get(get_tasks_handler))
        .with_state(state)
}
