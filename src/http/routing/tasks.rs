use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};

use crate::application::task_service::TaskService;
use crate::domain::task::{CreateTask, Task, TaskId, UpdateTask};
use crate::http::types::ApiError;

#[derive(Clone)]
pub struct AppState<S: TaskService> {
    pub service: S,
}

pub fn router<S: TaskService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/tasks", post(create_task::<S>).get(list_tasks::<S>))
        .route("/tasks/:id", put(update_task::<S>).delete(delete_task::<S>))
        .with_state(state)
}

async fn list_tasks<S: TaskService>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

async fn create_task<S: TaskService>(
    State(state): State<AppState<S>>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task<S: TaskService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTask>,
) -> Result<Json<Task>, ApiError> {
    let task = state.service.update(TaskId(id), payload).await?;
    Ok(Json(task))
}

async fn delete_task<S: TaskService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.service.delete(TaskId(id)).await?;
    Ok(Json(serde_json::json!({ "message": "task deleted" })))
}
