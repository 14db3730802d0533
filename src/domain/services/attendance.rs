use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::domain::models::user::AttendanceStatus;

/// Present only when the local login time falls in `[start, start + minutes)`.
pub fn attendance_for(
    login_at: DateTime<Utc>,
    tz: Tz,
    window_start: NaiveTime,
    window_minutes: i64,
) -> AttendanceStatus {
    let local = login_at.with_timezone(&tz).time();
    let (window_end, wrapped) = window_start.overflowing_add_signed(Duration::minutes(window_minutes));

    let inside = if wrapped == 0 {
        local >= window_start && local < window_end
    } else {
        local >= window_start || local < window_end
    };

    if inside { AttendanceStatus::Present } else { AttendanceStatus::Absent }
}
