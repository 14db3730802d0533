use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Household,
    Admin,
    Employee,
    Captain,
    SanitaryWorker,
}

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Employee | Role::Captain | Role::SanitaryWorker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
    Warned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub household_id: String,
    pub identifier: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub outstanding_balance: i64,
    #[serde(default = "default_family_size")]
    pub family_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gram_panchayat: Option<String>,
    #[serde(default)]
    pub booking_reminders: bool,
    #[serde(default)]
    pub has_green_badge: bool,

    // Staff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_status: Option<AttendanceStatus>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub last_login_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ip_address: Option<String>,
    #[serde(default)]
    pub login_streak: u32,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub last_streak_increment: Option<DateTime<Utc>>,
}

fn default_family_size() -> u32 {
    1
}

pub struct NewUserParams {
    pub name: String,
    pub household_id: String,
    pub identifier: String,
    pub role: Role,
    pub email: Option<String>,
    pub family_size: u32,
    pub address: Option<String>,
    pub gram_panchayat: Option<String>,
    pub outstanding_balance: i64,
}

impl User {
    pub fn new(params: NewUserParams, now: DateTime<Utc>) -> Self {
        Self {
            name: params.name,
            household_id: params.household_id,
            identifier: params.identifier,
            role: params.role,
            status: UserStatus::Active,
            warning_message: None,
            profile_picture: None,
            email: params.email,
            created_at: now,
            outstanding_balance: params.outstanding_balance,
            family_size: params.family_size,
            address: params.address,
            gram_panchayat: params.gram_panchayat,
            booking_reminders: true,
            has_green_badge: false,
            attendance_status: None,
            last_login_time: None,
            last_location: None,
            last_ip_address: None,
            login_streak: 0,
            last_streak_increment: None,
        }
    }
}
