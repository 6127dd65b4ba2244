//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User record stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID (also used as document ID)
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt digest; the plaintext is never stored
    pub password_hash: String,
    /// When the user registered (RFC 3339)
    pub created_at: String,
}

/// Document reserving a unique username or email for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub user_id: String,
}
