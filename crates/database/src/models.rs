//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    /// Identity key from the authentication provider.
    pub user_id: String,
    /// The profile as a JSON object.
    pub document: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}
