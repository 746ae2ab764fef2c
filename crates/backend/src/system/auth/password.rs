use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {}", e))
}

fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p))
}

/// Accounts imported from the old system keep bcrypt hashes until their next login
pub fn needs_rehash(hash: &str) -> bool {
    is_bcrypt(hash)
}

/// A malformed stored hash counts as a mismatch
pub fn verify_password(password: &str, hash: &str) -> bool {
    if is_bcrypt(hash) {
        return match bcrypt::verify(password, hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("Stored bcrypt hash is malformed: {}", e);
                false
            }
        };
    }

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("admin").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin", &hash));
        assert!(!verify_password("Admin", &hash));
        assert!(!needs_rehash(&hash));
    }

    #[test]
    fn garbage_hash_never_matches() {
        assert!(!verify_password("admin", "not-a-hash"));
        assert!(!verify_password("admin", "$2b$10$short"));
    }

    #[test]
    fn legacy_bcrypt_hashes_still_log_in() {
        // OpenWall crypt_blowfish vector
        let known = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        assert!(verify_password("U*U", known));
        assert!(!verify_password("U*V", known));
        assert!(needs_rehash(known));

        let hash = bcrypt::hash("secreto", 4).unwrap();
        assert!(hash.starts_with("$2b$"));
        assert!(verify_password("secreto", &hash));
        assert!(!verify_password("Secreto", &hash));

        let node_style = hash.replacen("$2b$", "$2y$", 1);
        assert!(verify_password("secreto", &node_style));
    }
}
