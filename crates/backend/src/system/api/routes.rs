use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, post, put},
    Router,
};

use crate::system::auth::middleware::{require_admin, require_auth, require_permission};
use crate::system::handlers;

/// Конфигурация системных роутов приложения
pub fn configure_system_routes() -> Router {
    Router::new()
        // ========================================
        // AUTH (PUBLIC)
        // ========================================
        .route("/api/login", post(handlers::auth::login))
        .route(
            "/api/me",
            get(handlers::auth::current_user).layer(middleware::from_fn(require_auth)),
        )
        .merge(user_routes())
        // ========================================
        // SCHEDULED TASKS (admin only)
        // ========================================
        .route(
            "/api/system/tasks",
            get(handlers::tasks::list).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/tasks/:id/run",
            post(handlers::tasks::run_now).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/tasks/:id/toggle",
            post(handlers::tasks::toggle).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/tasks/:id/progress/:session_id",
            get(handlers::tasks::progress).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/system/tasks/logs/:session_id",
            get(handlers::tasks::session_log).layer(middleware::from_fn(require_auth)),
        )
}

/// `/api/usuarios/*` plus the legacy paths, all behind the `usuarios` permission
fn user_routes() -> Router {
    Router::new()
        .route("/api/usuarios/users", get(handlers::users::list_users))
        .route("/api/usuarios/empresas", get(handlers::users::list_companies))
        .route("/api/usuarios/roles", get(handlers::users::list_roles))
        .route("/api/usuarios/permisos", get(handlers::users::list_permissions))
        .route("/api/usuarios/create", post(handlers::users::register))
        .route("/api/usuarios/update/:id", put(handlers::users::update))
        .route(
            "/api/usuarios/permisos/:user_id",
            get(handlers::users::user_permissions),
        )
        .route(
            "/api/usuarios/permisos/add",
            post(handlers::users::add_permission),
        )
        .route(
            "/api/usuarios/permisos/remove",
            post(handlers::users::remove_permission),
        )
        // Legacy
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/:id", put(handlers::users::update))
        .route("/api/empresas", get(handlers::users::list_companies))
        .route("/api/roles", get(handlers::users::list_roles))
        .route("/api/register", post(handlers::users::register))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_permission("usuarios", req, next)
        }))
        .route_layer(middleware::from_fn(require_auth))
}
