use anyhow::{Context, Result};
use contracts::system::users::{
    Company, Permission, PermissionAssignmentDto, Role, UpdateUserDto, UserListItem,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, FromQueryResult, QueryResult, Statement};

use crate::shared::data::db::get_connection;

/// Row of `usuarios` needed to authenticate
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user_id: i32,
    pub email: String,
    pub password_hash: String,
    pub nombre_usuario: Option<String>,
    pub activo: bool,
}

fn stmt(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, values)
}

pub async fn find_by_email(email: &str) -> Result<Option<StoredUser>> {
    let conn = get_connection()?;
    let row = conn
        .query_one(stmt(
            "SELECT user_id, email, password_hash, nombre_usuario, activo
             FROM usuarios WHERE email = $1",
            vec![email.into()],
        ))
        .await?;

    row.map(|row| -> Result<StoredUser> {
        Ok(StoredUser {
            user_id: row.try_get("", "user_id")?,
            email: row.try_get("", "email")?,
            password_hash: row.try_get("", "password_hash")?,
            nombre_usuario: row.try_get("", "nombre_usuario")?,
            activo: row.try_get::<Option<bool>>("", "activo")?.unwrap_or(false),
        })
    })
    .transpose()
}

/// First company/role pair of the user
pub async fn company_and_role(user_id: i32) -> Result<(Option<String>, Option<String>)> {
    let conn = get_connection()?;
    let row = conn
        .query_one(stmt(
            "SELECT e.nombre AS empresa, r.nombre AS rol
             FROM usuario_empresa ue
             JOIN empresas e ON e.empresa_id = ue.empresa_id
             JOIN roles r ON r.rol_id = ue.rol_id
             WHERE ue.user_id = $1
             ORDER BY ue.empresa_id
             LIMIT 1",
            vec![user_id.into()],
        ))
        .await?;

    match row {
        Some(row) => Ok((row.try_get("", "empresa")?, row.try_get("", "rol")?)),
        None => Ok((None, None)),
    }
}

/// Distinct permission names granted to the user in any company
pub async fn permission_names(user_id: i32) -> Result<Vec<String>> {
    let conn = get_connection()?;
    let rows = conn
        .query_all(stmt(
            "SELECT DISTINCT p.nombre
             FROM usuario_permiso up
             JOIN permisos p ON p.id = up.permiso_id
             WHERE up.user_id = $1
             ORDER BY p.nombre",
            vec![user_id.into()],
        ))
        .await?;
    rows.iter()
        .map(|r| r.try_get::<String>("", "nombre").map_err(Into::into))
        .collect()
}

pub async fn count_users() -> Result<i64> {
    let conn = get_connection()?;
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT COUNT(*)::BIGINT AS total FROM usuarios".to_string(),
        ))
        .await?;
    match row {
        Some(row) => Ok(row.try_get("", "total")?),
        None => Ok(0),
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    user_id: i32,
    email: String,
    nombre_usuario: Option<String>,
    dni: Option<String>,
    activo: Option<bool>,
    empresa: Option<String>,
    rol: Option<String>,
    empresa_id: Option<i32>,
    rol_id: Option<i32>,
}

pub async fn list_users() -> Result<Vec<UserListItem>> {
    let conn = get_connection()?;
    let rows = UserRow::find_by_statement(Statement::from_string(
        DatabaseBackend::Postgres,
        r#"
        SELECT u.user_id, u.email, u.nombre_usuario, u.dni, u.activo,
               e.nombre AS empresa, r.nombre AS rol,
               ue.empresa_id, ue.rol_id
        FROM usuarios u
        LEFT JOIN usuario_empresa ue ON ue.user_id = u.user_id
        LEFT JOIN empresas e ON e.empresa_id = ue.empresa_id
        LEFT JOIN roles r ON r.rol_id = ue.rol_id
        ORDER BY u.user_id
        "#
        .to_string(),
    ))
    .all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| UserListItem {
            user_id: r.user_id,
            email: r.email,
            nombre_usuario: r.nombre_usuario,
            dni: r.dni,
            activo: r.activo.unwrap_or(false),
            empresa: r.empresa,
            rol: r.rol,
            empresa_id: r.empresa_id,
            rol_id: r.rol_id,
        })
        .collect())
}

pub async fn list_companies() -> Result<Vec<Company>> {
    let conn = get_connection()?;
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT empresa_id, nombre FROM empresas ORDER BY nombre".to_string(),
        ))
        .await?;
    rows.iter()
        .map(|r| -> Result<Company> {
            Ok(Company {
                empresa_id: r.try_get("", "empresa_id")?,
                nombre: r.try_get("", "nombre")?,
            })
        })
        .collect()
}

pub async fn list_roles() -> Result<Vec<Role>> {
    let conn = get_connection()?;
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT rol_id, nombre FROM roles ORDER BY nombre".to_string(),
        ))
        .await?;
    rows.iter()
        .map(|r| -> Result<Role> {
            Ok(Role {
                rol_id: r.try_get("", "rol_id")?,
                nombre: r.try_get("", "nombre")?,
            })
        })
        .collect()
}

fn permission_from_row(r: &QueryResult) -> Result<Permission> {
    Ok(Permission {
        id: r.try_get("", "id")?,
        nombre: r.try_get("", "nombre")?,
        descripcion: r.try_get("", "descripcion")?,
    })
}

pub async fn list_permissions() -> Result<Vec<Permission>> {
    let conn = get_connection()?;
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT id, nombre, descripcion FROM permisos ORDER BY id".to_string(),
        ))
        .await?;
    rows.iter().map(permission_from_row).collect()
}

pub async fn user_permissions(user_id: i32) -> Result<Vec<Permission>> {
    let conn = get_connection()?;
    let rows = conn
        .query_all(stmt(
            "SELECT p.id, p.nombre, p.descripcion
             FROM usuario_permiso up
             JOIN permisos p ON p.id = up.permiso_id
             WHERE up.user_id = $1
             ORDER BY p.id",
            vec![user_id.into()],
        ))
        .await?;
    rows.iter().map(permission_from_row).collect()
}

pub async fn add_permission(dto: &PermissionAssignmentDto) -> Result<()> {
    let conn = get_connection()?;
    grant_permissions(conn, dto.user_id, dto.empresa_id, &[dto.permiso_id]).await
}

/// Returns whether a grant was removed
pub async fn remove_permission(dto: &PermissionAssignmentDto) -> Result<bool> {
    let conn = get_connection()?;
    let res = conn
        .execute(stmt(
            "DELETE FROM usuario_permiso
             WHERE user_id = $1 AND empresa_id IS NOT DISTINCT FROM $2 AND permiso_id = $3",
            vec![
                dto.user_id.into(),
                dto.empresa_id.into(),
                dto.permiso_id.into(),
            ],
        ))
        .await
        .context("Failed to remove permission")?;
    Ok(res.rows_affected() > 0)
}

// The functions below take a connection so they can run inside a transaction.

pub async fn email_exists<C: ConnectionTrait>(conn: &C, email: &str) -> Result<bool> {
    let row = conn
        .query_one(stmt(
            "SELECT 1 AS found FROM usuarios WHERE email = $1",
            vec![email.into()],
        ))
        .await?;
    Ok(row.is_some())
}

pub async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    password_hash: &str,
    nombre_usuario: &str,
    rol_id: Option<i32>,
) -> Result<i32> {
    let row = conn
        .query_one(stmt(
            "INSERT INTO usuarios (email, password_hash, nombre_usuario, rol_id, activo)
             VALUES ($1, $2, $3, $4, true)
             RETURNING user_id",
            vec![
                email.into(),
                password_hash.into(),
                nombre_usuario.into(),
                rol_id.into(),
            ],
        ))
        .await
        .context("Failed to insert user")?
        .ok_or_else(|| anyhow::anyhow!("INSERT INTO usuarios returned no row"))?;
    Ok(row.try_get("", "user_id")?)
}

pub async fn update_password_hash(user_id: i32, password_hash: &str) -> Result<()> {
    let conn = get_connection()?;
    conn.execute(stmt(
        "UPDATE usuarios SET password_hash = $1 WHERE user_id = $2",
        vec![password_hash.into(), user_id.into()],
    ))
    .await
    .context("Failed to update password hash")?;
    Ok(())
}

/// COALESCE update; returns whether the user exists
pub async fn update_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    dto: &UpdateUserDto,
) -> Result<bool> {
    let res = conn
        .execute(stmt(
            "UPDATE usuarios SET
                email = COALESCE($1, email),
                nombre_usuario = COALESCE($2, nombre_usuario),
                dni = COALESCE($3, dni),
                activo = COALESCE($4, activo),
                rol_id = COALESCE($5, rol_id)
             WHERE user_id = $6",
            vec![
                dto.email.clone().into(),
                dto.nombre_usuario.clone().into(),
                dto.dni.clone().into(),
                dto.activo.into(),
                dto.rol_id.into(),
                user_id.into(),
            ],
        ))
        .await
        .context("Failed to update user")?;
    Ok(res.rows_affected() > 0)
}

pub async fn upsert_membership<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    empresa_id: i32,
    rol_id: i32,
) -> Result<()> {
    conn.execute(stmt(
        "INSERT INTO usuario_empresa (user_id, empresa_id, rol_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id, empresa_id) DO UPDATE SET rol_id = EXCLUDED.rol_id",
        vec![user_id.into(), empresa_id.into(), rol_id.into()],
    ))
    .await
    .context("Failed to upsert usuario_empresa")?;
    Ok(())
}

/// Drops every grant of the user in that company
pub async fn clear_permissions<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    empresa_id: i32,
) -> Result<()> {
    conn.execute(stmt(
        "DELETE FROM usuario_permiso WHERE user_id = $1 AND empresa_id = $2",
        vec![user_id.into(), empresa_id.into()],
    ))
    .await?;
    Ok(())
}

pub async fn grant_permissions<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    empresa_id: Option<i32>,
    permisos_ids: &[i32],
) -> Result<()> {
    for permiso_id in permisos_ids {
        conn.execute(stmt(
            "INSERT INTO usuario_permiso (user_id, empresa_id, permiso_id)
             VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
            vec![user_id.into(), empresa_id.into(), (*permiso_id).into()],
        ))
        .await
        .with_context(|| format!("Failed to grant permission {}", permiso_id))?;
    }
    Ok(())
}

/// Copies the role's default permissions from `rol_permiso`
pub async fn grant_role_defaults<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    empresa_id: Option<i32>,
    rol_id: i32,
) -> Result<u64> {
    let res = conn
        .execute(stmt(
            "INSERT INTO usuario_permiso (user_id, empresa_id, permiso_id)
             SELECT $1, $2, rp.permiso_id FROM rol_permiso rp WHERE rp.rol_id = $3
             ON CONFLICT DO NOTHING",
            vec![user_id.into(), empresa_id.into(), rol_id.into()],
        ))
        .await?;
    Ok(res.rows_affected())
}

pub async fn ensure_company<C: ConnectionTrait>(conn: &C, nombre: &str) -> Result<i32> {
    let row = conn
        .query_one(stmt(
            "WITH ins AS (
                INSERT INTO empresas (nombre) VALUES ($1)
                ON CONFLICT (nombre) DO NOTHING
                RETURNING empresa_id
             )
             SELECT empresa_id FROM ins
             UNION ALL
             SELECT empresa_id FROM empresas WHERE nombre = $1
             LIMIT 1",
            vec![nombre.into()],
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Company '{}' could not be created", nombre))?;
    Ok(row.try_get("", "empresa_id")?)
}

pub async fn ensure_role<C: ConnectionTrait>(conn: &C, nombre: &str) -> Result<i32> {
    let row = conn
        .query_one(stmt(
            "WITH ins AS (
                INSERT INTO roles (nombre) VALUES ($1)
                ON CONFLICT (nombre) DO NOTHING
                RETURNING rol_id
             )
             SELECT rol_id FROM ins
             UNION ALL
             SELECT rol_id FROM roles WHERE nombre = $1
             LIMIT 1",
            vec![nombre.into()],
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Role '{}' could not be created", nombre))?;
    Ok(row.try_get("", "rol_id")?)
}

/// Every row of `permisos` becomes a role default and a user grant
pub async fn grant_all_permissions<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    empresa_id: i32,
    rol_id: i32,
) -> Result<()> {
    conn.execute(stmt(
        "INSERT INTO rol_permiso (rol_id, permiso_id)
         SELECT $1, id FROM permisos
         ON CONFLICT DO NOTHING",
        vec![rol_id.into()],
    ))
    .await?;
    grant_role_defaults(conn, user_id, Some(empresa_id), rol_id).await?;
    Ok(())
}
