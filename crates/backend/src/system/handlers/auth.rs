use axum::Json;
use contracts::system::auth::{LoginRequest, LoginResponse, TokenClaims};

use crate::system::auth::{extractor::CurrentUser, AuthError};
use crate::system::users::service as user_service;

/// POST /api/login
pub async fn login(Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, AuthError> {
    user_service::login(&request).await.map(Json)
}

/// GET /api/me
pub async fn current_user(CurrentUser(claims): CurrentUser) -> Json<TokenClaims> {
    Json(claims)
}
