use axum::{extract::Path, http::StatusCode, Json};
use contracts::shared::response::ApiErrorBody;
use contracts::system::tasks::aggregate::{ScheduledTask, ScheduledTaskId};
use contracts::system::tasks::progress::TaskProgress;
use serde_json::{json, Value};

use crate::system::tasks::{initialization, service, worker};

type ApiError = (StatusCode, Json<ApiErrorBody>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiErrorBody::error(message)))
}

fn parse_id(id: &str) -> Result<ScheduledTaskId, ApiError> {
    ScheduledTaskId::from_string(id).map_err(|e| error(StatusCode::BAD_REQUEST, e))
}

async fn load(id: &ScheduledTaskId) -> Result<ScheduledTask, ApiError> {
    service::get_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load task {}: {:#}", id.as_string(), e);
            error(StatusCode::INTERNAL_SERVER_ERROR, "Error al obtener la tarea")
        })?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Tarea no encontrada"))
}

/// GET /api/system/tasks
pub async fn list() -> Result<Json<Vec<ScheduledTask>>, ApiError> {
    service::list_all().await.map(Json).map_err(|e| {
        tracing::error!("Failed to list scheduled tasks: {:#}", e);
        error(StatusCode::INTERNAL_SERVER_ERROR, "Error al listar tareas")
    })
}

/// POST /api/system/tasks/:id/toggle
pub async fn toggle(Path(id): Path<String>) -> Result<Json<ScheduledTask>, ApiError> {
    let task_id = parse_id(&id)?;
    match service::toggle_enabled(&task_id).await {
        Ok(Some(task)) => Ok(Json(task)),
        Ok(None) => Err(error(StatusCode::NOT_FOUND, "Tarea no encontrada")),
        Err(e) => {
            tracing::error!("Failed to toggle task {}: {:#}", id, e);
            Err(error(StatusCode::INTERNAL_SERVER_ERROR, "Error al actualizar la tarea"))
        }
    }
}

/// POST /api/system/tasks/:id/run
pub async fn run_now(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let task = load(&parse_id(&id)?).await?;
    let registry = initialization::registry().ok_or_else(|| {
        error(StatusCode::SERVICE_UNAVAILABLE, "El planificador no está iniciado")
    })?;

    let code = task.code.clone();
    let session_id = worker::spawn_task_run(registry, initialization::task_logger(), task)
        .await
        .map_err(|e| {
            tracing::error!("Failed to start task {}: {:#}", code, e);
            error(StatusCode::INTERNAL_SERVER_ERROR, "Error al iniciar la tarea")
        })?;

    tracing::info!("Task '{}' triggered manually, session {}", code, session_id);
    Ok(Json(json!({ "ok": true, "session_id": session_id })))
}

/// GET /api/system/tasks/:id/progress/:session_id
pub async fn progress(
    Path((id, session_id)): Path<(String, String)>,
) -> Result<Json<TaskProgress>, ApiError> {
    let task = load(&parse_id(&id)?).await?;
    let manager = initialization::registry()
        .and_then(|r| r.get(&task.task_type))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Tipo de tarea desconocido"))?;

    let mut progress = manager
        .get_progress(&session_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Sesión no encontrada"))?;
    progress.log_content = initialization::task_logger()
        .read_log(&session_id)
        .ok()
        .flatten();
    Ok(Json(progress))
}

/// GET /api/system/tasks/logs/:session_id
pub async fn session_log(Path(session_id): Path<String>) -> Result<String, ApiError> {
    match initialization::task_logger().read_log(&session_id) {
        Ok(Some(content)) => Ok(content),
        Ok(None) => Err(error(StatusCode::NOT_FOUND, "Log no encontrado")),
        Err(e) => Err(error(StatusCode::BAD_REQUEST, e.to_string())),
    }
}
