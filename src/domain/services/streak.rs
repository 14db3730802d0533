use chrono::{DateTime, Days, Utc};
use chrono_tz::Tz;

use crate::domain::models::user::User;

/// Applies the consecutive-day login rule in the given timezone. Returns
/// whether the streak fields changed.
pub fn apply_login_streak(user: &mut User, now: DateTime<Utc>, tz: Tz) -> bool {
    let today = now.with_timezone(&tz).date_naive();

    let next = match user.last_streak_increment {
        Some(last) => {
            let last_day = last.with_timezone(&tz).date_naive();
            if last_day == today {
                return false;
            }
            if today.checked_sub_days(Days::new(1)) == Some(last_day) {
                user.login_streak.saturating_add(1)
            } else {
                1
            }
        }
        None => 1,
    };

    user.login_streak = next;
    user.last_streak_increment = Some(now);
    true
}
