use axum::{
    extract::{Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use contracts::shared::response::ApiErrorBody;
use contracts::system::users::{
    PermissionAssignmentDto, RegisterUserDto, UpdateUserDto, UserPermissionsResponse,
};
use serde_json::{json, Value};

use crate::system::users::{repository, service, service::UserError};

type HandlerResult = Result<Json<Value>, (StatusCode, Json<ApiErrorBody>)>;

fn internal(context: &str, e: anyhow::Error) -> (StatusCode, Json<ApiErrorBody>) {
    tracing::error!("{}: {:#}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorBody::message(context)),
    )
}

/// GET /api/usuarios/users
pub async fn list_users() -> HandlerResult {
    let usuarios = repository::list_users()
        .await
        .map_err(|e| internal("Error al obtener usuarios", e))?;
    Ok(Json(json!({ "ok": true, "usuarios": usuarios })))
}

/// GET /api/usuarios/empresas
pub async fn list_companies() -> HandlerResult {
    let empresas = repository::list_companies()
        .await
        .map_err(|e| internal("Error al obtener empresas", e))?;
    Ok(Json(json!({ "ok": true, "empresas": empresas })))
}

/// GET /api/usuarios/roles
pub async fn list_roles() -> HandlerResult {
    let roles = repository::list_roles()
        .await
        .map_err(|e| internal("Error al obtener roles", e))?;
    Ok(Json(json!({ "ok": true, "roles": roles })))
}

/// GET /api/usuarios/permisos
pub async fn list_permissions() -> HandlerResult {
    let permisos = repository::list_permissions()
        .await
        .map_err(|e| internal("Error al obtener permisos", e))?;
    Ok(Json(json!({ "ok": true, "permisos": permisos })))
}

/// POST /api/usuarios/create
pub async fn register(
    Json(dto): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, UserError> {
    let user_id = service::register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "message": "Usuario creado correctamente",
            "user_id": user_id
        })),
    ))
}

/// PUT /api/usuarios/update/:id
pub async fn update(
    Path(id): Path<i32>,
    Json(dto): Json<UpdateUserDto>,
) -> Result<Json<Value>, UserError> {
    service::update(id, dto).await?;
    Ok(Json(json!({ "ok": true, "message": "Usuario actualizado" })))
}

/// GET /api/usuarios/permisos/:user_id
pub async fn user_permissions(
    Path(user_id): Path<i32>,
) -> Result<Json<UserPermissionsResponse>, (StatusCode, Json<ApiErrorBody>)> {
    let permisos = repository::user_permissions(user_id)
        .await
        .map_err(|e| internal("Error al obtener permisos", e))?;
    let permisos_ids = permisos.iter().map(|p| p.id).collect();
    Ok(Json(UserPermissionsResponse {
        ok: true,
        permisos,
        permisos_ids,
    }))
}

/// POST /api/usuarios/permisos/add
pub async fn add_permission(
    Json(dto): Json<PermissionAssignmentDto>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiErrorBody>)> {
    repository::add_permission(&dto)
        .await
        .map_err(|e| internal("Error al asignar permiso", e))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "message": "Permiso asignado" })),
    ))
}

/// POST /api/usuarios/permisos/remove
pub async fn remove_permission(Json(dto): Json<PermissionAssignmentDto>) -> HandlerResult {
    let removed = repository::remove_permission(&dto)
        .await
        .map_err(|e| internal("Error al eliminar permiso", e))?;
    if !removed {
        tracing::debug!(
            "Permission {} was not granted to user {}",
            dto.permiso_id,
            dto.user_id
        );
    }
    Ok(Json(json!({ "ok": true, "message": "Permiso eliminado" })))
}
