use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::shared::response::ApiErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token requerido")]
    MissingToken,
    #[error("Token inválido")]
    InvalidToken,
    #[error("No autorizado")]
    Forbidden,
    #[error("Email y contraseña son requeridos")]
    MissingCredentials,
    #[error("Usuario no encontrado")]
    UserNotFound,
    #[error("Usuario inactivo")]
    InactiveUser,
    #[error("Contraseña incorrecta")]
    WrongPassword,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::UserNotFound
            | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden | AuthError::InactiveUser => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AuthError::Internal(e) => {
                tracing::error!("Auth failure: {:#}", e);
                ApiErrorBody::error("Error interno del servidor")
            }
            other => ApiErrorBody::error(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failures_map_to_distinct_statuses() {
        assert_eq!(AuthError::MissingCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::UserNotFound.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InactiveUser.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::WrongPassword.to_string(), "Contraseña incorrecta");
    }
}
