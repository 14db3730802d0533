use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SellRequestStatus {
    Pending,
    Approved,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    pub plastic: bool,
    pub paper: bool,
    pub bottles: bool,
    pub glass: bool,
    #[serde(default)]
    pub other: String,
}

impl Materials {
    pub fn is_empty(&self) -> bool {
        !self.plastic && !self.paper && !self.bottles && !self.glass && self.other.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub id: String,
    pub household_id: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub materials: Materials,
    pub weight_kg: f64,
    pub status: SellRequestStatus,
}

impl SellRequest {
    pub fn new(household_id: String, materials: Materials, weight_kg: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            household_id,
            date: now,
            materials,
            weight_kg,
            status: SellRequestStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequestMessage {
    pub id: String,
    pub sell_request_id: String,
    pub sender_id: String,
    pub text: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}
