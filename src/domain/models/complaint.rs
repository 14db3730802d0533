use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub household_id: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub issue: String,
    pub details: String,
    pub status: ComplaintStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Complaint {
    pub fn new(household_id: String, issue: String, details: String, photo: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            household_id,
            date: now,
            issue,
            details,
            status: ComplaintStatus::Pending,
            photo,
        }
    }
}
