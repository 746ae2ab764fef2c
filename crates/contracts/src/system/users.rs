use serde::{Deserialize, Serialize};

/// Fila del listado de usuarios (LEFT JOIN con empresa y rol)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListItem {
    pub user_id: i32,
    pub email: String,
    pub nombre_usuario: Option<String>,
    pub dni: Option<String>,
    pub activo: bool,
    pub empresa: Option<String>,
    pub rol: Option<String>,
    pub empresa_id: Option<i32>,
    pub rol_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub empresa_id: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub rol_id: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterUserDto {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nombre_usuario: Option<String>,
    pub empresa_id: Option<i32>,
    pub rol_id: Option<i32>,
    /// Explicit permissions; the role defaults are copied when absent or empty
    #[serde(default)]
    pub permisos_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserDto {
    pub email: Option<String>,
    pub nombre_usuario: Option<String>,
    pub dni: Option<String>,
    pub activo: Option<bool>,
    pub rol_id: Option<i32>,
    pub empresa_id: Option<i32>,
    #[serde(default)]
    pub permisos_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissionsResponse {
    pub ok: bool,
    pub permisos: Vec<Permission>,
    pub permisos_ids: Vec<i32>,
}

/// Body of `POST /api/usuarios/permisos/add|remove`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionAssignmentDto {
    pub user_id: i32,
    #[serde(default)]
    pub empresa_id: Option<i32>,
    pub permiso_id: i32,
}
