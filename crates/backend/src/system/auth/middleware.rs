use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use contracts::system::auth::TokenClaims;

use super::AuthError;

fn bearer_claims(req: &Request<Body>) -> Result<TokenClaims, AuthError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    super::jwt::validate_token(token).map_err(|e| {
        tracing::debug!("Rejected token: {:#}", e);
        AuthError::InvalidToken
    })
}

/// Middleware that requires a valid JWT
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, AuthError> {
    let claims = bearer_claims(&req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware that requires the `admin` role
pub async fn require_admin(mut req: Request<Body>, next: Next) -> Result<Response, AuthError> {
    let claims = bearer_claims(&req)?;
    if !claims.is_admin() {
        return Err(AuthError::Forbidden);
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Runs after `require_auth`. Usage:
/// `.layer(middleware::from_fn(|req, next| require_permission("usuarios", req, next)))`
pub async fn require_permission(
    permiso: &'static str,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = req
        .extensions()
        .get::<TokenClaims>()
        .ok_or(AuthError::MissingToken)?;
    if !claims.has_permission(permiso) {
        tracing::warn!("User {} lacks permission '{}'", claims.email, permiso);
        return Err(AuthError::Forbidden);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config;
    use crate::system::auth::jwt::{issue_token, TokenSubject};
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn token(rol: &str, permisos: &[&str]) -> String {
        let secret = &config::init_for_tests().auth.jwt_secret;
        issue_token(
            TokenSubject {
                user_id: 3,
                email: "caja@bauhaus".into(),
                nombre: "Caja".into(),
                empresa: Some("Bauhaus".into()),
                rol: Some(rol.into()),
                permisos: permisos.iter().map(|p| p.to_string()).collect(),
            },
            secret,
            1,
        )
        .unwrap()
    }

    fn admin_router() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(require_admin))
    }

    fn permission_router() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(|req: Request<Body>, next: Next| {
                require_permission("usuarios", req, next)
            }))
            .layer(middleware::from_fn(require_auth))
    }

    async fn call(router: Router, auth: Option<String>) -> (StatusCode, serde_json::Value) {
        config::init_for_tests();
        let mut req = axum::http::Request::builder().uri("/");
        if let Some(auth) = auth {
            req = req.header("Authorization", auth);
        }
        let resp = router.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        let (status, body) = call(permission_router(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Token requerido");

        let (status, _) = call(admin_router(), Some("Bearer ".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_token_is_401() {
        let (status, body) = call(permission_router(), Some("Bearer abc.def.ghi".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token inválido");

        let foreign = issue_token(
            TokenSubject {
                user_id: 1,
                email: "x@x".into(),
                nombre: String::new(),
                empresa: None,
                rol: Some("admin".into()),
                permisos: vec![],
            },
            "another-secret",
            1,
        )
        .unwrap();
        let (status, body) = call(admin_router(), Some(format!("Bearer {}", foreign))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token inválido");
    }

    #[tokio::test]
    async fn missing_permission_is_403() {
        let auth = format!("Bearer {}", token("operador", &["reportes"]));
        let (status, body) = call(permission_router(), Some(auth)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "No autorizado");

        let auth = format!("Bearer {}", token("operador", &["usuarios"]));
        let (status, _) = call(permission_router(), Some(auth)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_passes_every_check() {
        let auth = format!("Bearer {}", token("Admin", &[]));
        let (status, _) = call(permission_router(), Some(auth.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(admin_router(), Some(auth)).await;
        assert_eq!(status, StatusCode::OK);

        let auth = format!("Bearer {}", token("operador", &["usuarios"]));
        let (status, body) = call(admin_router(), Some(auth)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "No autorizado");
    }
}
