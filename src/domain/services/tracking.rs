use chrono::{DateTime, Duration, Utc};

use crate::domain::models::user::{Location, Role, User};

pub const ACTIVE_LOCATION_WINDOW_MINUTES: i64 = 15;
const EARTH_RADIUS_KM: f64 = 6371.0;
const AVERAGE_SPEED_KMH: f64 = 15.0;

/// First captain whose last fix is newer than the active window.
pub fn find_active_captain(users: &[User], now: DateTime<Utc>) -> Option<&User> {
    let cutoff = now - Duration::minutes(ACTIVE_LOCATION_WINDOW_MINUTES);
    users.iter().find(|u| {
        u.role == Role::Captain && u.last_location.as_ref().is_some_and(|loc| loc.timestamp > cutoff)
    })
}

pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtaRange {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

pub fn estimate_eta(vehicle: &Location, household: &Location) -> EtaRange {
    let hours = haversine_km(vehicle, household) / AVERAGE_SPEED_KMH;
    let minutes = (hours * 60.0).round() as i64;
    EtaRange { min_minutes: minutes, max_minutes: minutes + 5 }
}
