use serde::{Deserialize, Serialize};

/// A stored credential record. The hash never leaves the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
