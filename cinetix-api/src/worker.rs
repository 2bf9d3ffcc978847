use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{debug, error};

use cinetix_booking::{HoldManager, ReservationManager};

const SWEEP_BATCH_SIZE: usize = 100;

/// Periodic cleanup: drains expired seat holds and flips overdue pending
/// reservations to Expired. Runs until the process exits.
pub async fn start_expiry_worker(
    holds: Arc<HoldManager>,
    reservations: Arc<ReservationManager>,
    interval: Duration,
) {
    tracing::info!("Expiry worker started, sweeping every {:?}", interval);
    loop {
        sleep(interval).await;

        loop {
            match holds.cleanup_expired_holds(SWEEP_BATCH_SIZE).await {
                Ok(0) => break,
                Ok(n) => debug!("Removed {} expired seat holds", n),
                Err(e) => {
                    error!("Hold cleanup failed: {}", e);
                    break;
                }
            }
        }

        match reservations.expire_reservations().await {
            Ok(0) => {}
            Ok(n) => debug!("Expired {} overdue reservations", n),
            Err(e) => error!("Reservation expiry sweep failed: {}", e),
        }
    }
}
