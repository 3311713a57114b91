//! Authorization gate consulted by the lifecycle and admin paths. Roles are
//! read fresh from the identity store on every check so a revocation takes
//! effect on the next request.

use sqlx::SqlitePool;

use crate::auth::identity;
use crate::errors::AppError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

pub async fn require_admin(pool: &SqlitePool, caller: &str) -> Result<(), AppError> {
    let role = identity::get_role(pool, caller).await?;
    if role != ROLE_ADMIN {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

/// Owners may act on their own resources; admins may act on any.
pub async fn require_owner_or_admin(
    pool: &SqlitePool,
    caller: &str,
    owner_id: &str,
) -> Result<(), AppError> {
    if caller == owner_id {
        return Ok(());
    }
    let role = identity::get_role(pool, caller).await?;
    if role != ROLE_ADMIN {
        return Err(AppError::Forbidden(
            "Only the owner or an admin may do this".to_string(),
        ));
    }
    Ok(())
}
