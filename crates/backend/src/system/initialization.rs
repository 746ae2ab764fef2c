use anyhow::Result;

use crate::system::users::{repository, service};

/// Creates the default admin account when `usuarios` is empty
pub async fn ensure_admin_user_exists() -> Result<()> {
    let count = repository::count_users().await?;
    if count > 0 {
        tracing::debug!("{} users found, admin bootstrap skipped", count);
        return Ok(());
    }

    tracing::info!("No users found. Creating default admin user...");
    let admin_id = service::create_default_admin().await?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Default admin user created!");
    tracing::warn!("  Email:    admin@local");
    tracing::warn!("  Password: admin");
    tracing::warn!("  User ID:  {}", admin_id);
    tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(())
}
