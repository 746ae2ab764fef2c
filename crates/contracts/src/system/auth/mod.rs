use serde::{Deserialize, Serialize};

/// Body of `POST /api/login`. Fields are optional so a missing one yields 400, not 422.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub user: UserInfo,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub nombre: String,
    pub email: String,
    pub empresa: Option<String>,
    pub rol: Option<String>,
}

/// Claims del JWT emitido al iniciar sesion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: i32, // user_id
    pub email: String,
    pub nombre: String,
    pub empresa: Option<String>,
    pub rol: Option<String>,
    #[serde(default)]
    pub permisos: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

impl TokenClaims {
    pub fn is_admin(&self) -> bool {
        self.rol
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case("admin"))
            .unwrap_or(false)
    }

    /// Admins pass every permission check
    pub fn has_permission(&self, permiso: &str) -> bool {
        self.is_admin() || self.permisos.iter().any(|p| p == permiso)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(rol: Option<&str>, permisos: &[&str]) -> TokenClaims {
        TokenClaims {
            sub: 1,
            email: "a@b.c".into(),
            nombre: "A".into(),
            empresa: None,
            rol: rol.map(String::from),
            permisos: permisos.iter().map(|p| p.to_string()).collect(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn admin_has_every_permission() {
        assert!(claims(Some("Admin"), &[]).has_permission("usuarios"));
    }

    #[test]
    fn regular_user_needs_explicit_permission() {
        let c = claims(Some("operador"), &["reportes"]);
        assert!(c.has_permission("reportes"));
        assert!(!c.has_permission("usuarios"));
    }
}
