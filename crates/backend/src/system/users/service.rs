use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::shared::response::ApiErrorBody;
use contracts::system::auth::{LoginRequest, LoginResponse, UserInfo};
use contracts::system::users::{RegisterUserDto, UpdateUserDto};
use sea_orm::TransactionTrait;

use super::repository;
use crate::shared::data::db::get_connection;
use crate::system::auth::jwt::{self, TokenSubject};
use crate::system::auth::{password, AuthError};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Faltan datos")]
    MissingFields,
    #[error("Email ya registrado")]
    DuplicateEmail,
    #[error("Usuario no encontrado")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::MissingFields => StatusCode::BAD_REQUEST,
            UserError::DuplicateEmail => StatusCode::CONFLICT,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let message = match &self {
            UserError::Internal(e) => {
                tracing::error!("User operation failed: {:#}", e);
                "Error interno del servidor".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(ApiErrorBody::message(message))).into_response()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Login still succeeds when the upgrade fails; the old hash stays valid
async fn upgrade_hash(user_id: i32, pass: &str) {
    let result = match password::hash_password(pass) {
        Ok(hash) => repository::update_password_hash(user_id, &hash).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => tracing::info!("Password hash of user {} upgraded to argon2", user_id),
        Err(e) => tracing::warn!("Could not upgrade password hash of user {}: {}", user_id, e),
    }
}

/// Checks the credentials and issues a token carrying company, role and permissions
pub async fn login(request: &LoginRequest) -> Result<LoginResponse, AuthError> {
    let (Some(email), Some(pass)) = (
        non_empty(request.email.as_deref()),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AuthError::MissingCredentials);
    };

    let user = repository::find_by_email(email)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    if !user.activo {
        return Err(AuthError::InactiveUser);
    }
    if !password::verify_password(pass, &user.password_hash) {
        tracing::warn!("Wrong password for {}", user.email);
        return Err(AuthError::WrongPassword);
    }
    if password::needs_rehash(&user.password_hash) {
        upgrade_hash(user.user_id, pass).await;
    }

    let (empresa, rol) = repository::company_and_role(user.user_id).await?;
    let permisos = repository::permission_names(user.user_id).await?;
    let nombre = user.nombre_usuario.clone().unwrap_or_default();

    let token = jwt::generate_access_token(TokenSubject {
        user_id: user.user_id,
        email: user.email.clone(),
        nombre: nombre.clone(),
        empresa: empresa.clone(),
        rol: rol.clone(),
        permisos,
    })?;

    tracing::info!("User {} logged in", user.email);
    Ok(LoginResponse {
        ok: true,
        user: UserInfo {
            id: user.user_id,
            nombre,
            email: user.email,
            empresa,
            rol,
        },
        token,
    })
}

/// User, membership and grants are written in one transaction
pub async fn register(dto: RegisterUserDto) -> Result<i32, UserError> {
    let (Some(email), Some(pass), Some(nombre)) = (
        non_empty(dto.email.as_deref()),
        dto.password.as_deref().filter(|p| !p.is_empty()),
        non_empty(dto.nombre_usuario.as_deref()),
    ) else {
        return Err(UserError::MissingFields);
    };

    let conn = get_connection()?;
    if repository::email_exists(conn, email).await? {
        return Err(UserError::DuplicateEmail);
    }
    let password_hash = password::hash_password(pass)?;

    let txn = conn.begin().await.map_err(anyhow::Error::from)?;
    let user_id = repository::insert_user(&txn, email, &password_hash, nombre, dto.rol_id).await?;

    if let (Some(empresa_id), Some(rol_id)) = (dto.empresa_id, dto.rol_id) {
        repository::upsert_membership(&txn, user_id, empresa_id, rol_id).await?;
    }

    match dto.permisos_ids.as_deref() {
        Some(ids) if !ids.is_empty() => {
            repository::grant_permissions(&txn, user_id, dto.empresa_id, ids).await?;
        }
        _ => {
            if let Some(rol_id) = dto.rol_id {
                let granted =
                    repository::grant_role_defaults(&txn, user_id, dto.empresa_id, rol_id).await?;
                tracing::debug!("Role {} defaults granted: {}", rol_id, granted);
            }
        }
    }

    txn.commit().await.map_err(anyhow::Error::from)?;
    tracing::info!("User {} registered with id {}", email, user_id);
    Ok(user_id)
}

/// COALESCE update. With both company and role, the grants for that company are reset.
pub async fn update(user_id: i32, dto: UpdateUserDto) -> Result<(), UserError> {
    let conn = get_connection()?;
    let txn = conn.begin().await.map_err(anyhow::Error::from)?;

    if !repository::update_user(&txn, user_id, &dto).await? {
        return Err(UserError::NotFound);
    }

    if let (Some(empresa_id), Some(rol_id)) = (dto.empresa_id, dto.rol_id) {
        repository::upsert_membership(&txn, user_id, empresa_id, rol_id).await?;
        repository::clear_permissions(&txn, user_id, empresa_id).await?;
        match dto.permisos_ids.as_deref() {
            Some(ids) if !ids.is_empty() => {
                repository::grant_permissions(&txn, user_id, Some(empresa_id), ids).await?;
            }
            _ => {
                repository::grant_role_defaults(&txn, user_id, Some(empresa_id), rol_id).await?;
            }
        }
    }

    txn.commit().await.map_err(anyhow::Error::from)?;
    tracing::info!("User {} updated", user_id);
    Ok(())
}

/// First-run account: company Bauhaus, role admin, user admin@local with every permission
pub async fn create_default_admin() -> Result<i32> {
    let conn = get_connection()?;
    let txn = conn.begin().await?;

    let empresa_id = repository::ensure_company(&txn, "Bauhaus").await?;
    let rol_id = repository::ensure_role(&txn, "admin").await?;
    let password_hash = password::hash_password("admin")?;
    let user_id =
        repository::insert_user(&txn, "admin@local", &password_hash, "Administrador", Some(rol_id))
            .await?;
    repository::upsert_membership(&txn, user_id, empresa_id, rol_id).await?;
    repository::grant_all_permissions(&txn, user_id, empresa_id, rol_id).await?;

    txn.commit().await?;
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_without_password_is_rejected_before_any_query() {
        let request = LoginRequest {
            email: Some("admin@local".into()),
            password: None,
        };
        let err = login(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[tokio::test]
    async fn register_requires_email_password_and_name() {
        let dto = RegisterUserDto {
            email: Some("a@b.c".into()),
            password: Some("x".into()),
            nombre_usuario: Some("  ".into()),
            ..Default::default()
        };
        let err = register(dto).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        assert_eq!(UserError::DuplicateEmail.status(), StatusCode::CONFLICT);
    }
}
