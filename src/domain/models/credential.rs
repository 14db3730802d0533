use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Password material, kept apart from the profile record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub identifier: String,
    pub household_id: String,
    pub password_hash: String,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}
