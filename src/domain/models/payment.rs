use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "Pending Verification")]
    PendingVerification,
    Paid,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub household_id: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub amount: i64,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Payment {
    /// A household-submitted payment awaiting verification.
    pub fn new(household_id: String, amount: i64, screenshot: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            household_id,
            date: now,
            amount,
            status: PaymentStatus::PendingVerification,
            screenshot,
            rejection_reason: None,
        }
    }
}
