use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::shared::config;

/// Who the token is issued for
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: i32,
    pub email: String,
    pub nombre: String,
    pub empresa: Option<String>,
    pub rol: Option<String>,
    pub permisos: Vec<String>,
}

/// HS256 token valid for `lifetime_hours`
pub fn issue_token(subject: TokenSubject, secret: &str, lifetime_hours: i64) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::hours(lifetime_hours)).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claims = TokenClaims {
        sub: subject.user_id,
        email: subject.email,
        nombre: subject.nombre,
        empresa: subject.empresa,
        rol: subject.rol,
        permisos: subject.permisos,
        exp,
        iat,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

pub fn decode_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(data.claims)
}

/// Token signed with the configured secret and lifetime
pub fn generate_access_token(subject: TokenSubject) -> Result<String> {
    let auth = &config::get()?.auth;
    issue_token(subject, &auth.jwt_secret, auth.token_lifetime_hours)
}

pub fn validate_token(token: &str) -> Result<TokenClaims> {
    decode_token(token, &config::get()?.auth.jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: 7,
            email: "ana@local".into(),
            nombre: "Ana".into(),
            empresa: Some("Bauhaus".into()),
            rol: Some("operador".into()),
            permisos: vec!["reportes".into()],
        }
    }

    #[test]
    fn token_round_trip_keeps_permissions() {
        let token = issue_token(subject(), "secret", 12).unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.permisos, vec!["reportes".to_string()]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(subject(), "secret", 12).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(subject(), "secret", -2).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}
