/// Default operator account seeding
///
/// Run once at boot, after migrations. Creates the configured operator
/// account if it does not exist; if it already does, the existing account
/// is left untouched (the password is NOT reset to the configured value).

use crate::config::AdminConfig;
use sqlx::PgPool;
use todovault_shared::{
    auth::password,
    models::user::{CreateUser, User},
};
use tracing::{info, warn};

/// Ensures the default operator account exists
///
/// Idempotent: safe to run on every boot, including concurrent boots of
/// multiple instances (a lost race surfaces as a unique violation, which
/// is treated the same as "already exists").
///
/// # Errors
///
/// Returns an error if hashing or the database operation fails for any
/// reason other than the account already existing.
pub async fn ensure_default_operator(pool: &PgPool, admin: &AdminConfig) -> anyhow::Result<()> {
    if User::find_by_username(pool, &admin.username).await?.is_some() {
        info!(username = %admin.username, "Default operator account already exists");
        return Ok(());
    }

    if admin.password == "admin" {
        warn!("Default operator account uses the built-in password; set ADMIN_PASSWORD");
    }

    let password_hash = password::hash_password(&admin.password)?;

    match User::create(
        pool,
        CreateUser {
            username: admin.username.clone(),
            password_hash,
        },
    )
    .await
    {
        Ok(user) => {
            info!(username = %user.username, user_id = user.id, "Seeded default operator account");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.constraint().is_some() => {
            // Another instance won the race
            info!(username = %admin.username, "Default operator account already exists");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
