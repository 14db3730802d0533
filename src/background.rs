use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, Instrument};

use crate::domain::ports::LocationSource;
use crate::domain::services::data_repository::DataRepository;
use crate::state::AppState;

/// Feeds a staff device's fixes into the user record until the source ends.
/// Returns how many fixes were stored.
pub async fn track_staff_location(
    repo: DataRepository,
    household_id: String,
    source: Arc<dyn LocationSource>,
    interval: Duration,
) -> usize {
    let span = info_span!("staff_tracking", household_id = %household_id);

    async move {
        info!("Starting location tracking");
        let mut recorded = 0;

        loop {
            match source.next_fix().await {
                Ok(Some(fix)) => match repo.update_user_location(&household_id, fix).await {
                    Ok(user) => {
                        recorded += 1;
                        debug!(location = ?user.last_location, "Location stored");
                    }
                    Err(e) => error!("Failed to store location: {:?}", e),
                },
                Ok(None) => break,
                Err(e) => error!("Location source failed: {:?}", e),
            }
            sleep(interval).await;
        }

        info!(recorded, "Location tracking stopped");
        recorded
    }
    .instrument(span)
    .await
}

pub fn spawn_staff_tracking(
    state: &AppState,
    household_id: String,
    source: Arc<dyn LocationSource>,
) -> JoinHandle<usize> {
    let interval = Duration::from_secs(state.config.location_poll_secs);
    tokio::spawn(track_staff_location(state.repo.clone(), household_id, source, interval))
}
