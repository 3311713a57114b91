use serde::Serialize;

/// Safe projection for API responses — never carries the password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

/// Internal struct for credential verification.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    pub id: String,
    pub password_hash: String,
}

/// New user data for registration / seeding.
pub struct NewUser {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}
