use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::service::RoomService;

/// Identifies the round a challenge timer was armed for. Checked against the
/// room when the timer fires; any mismatch means the round already moved on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoundTag {
    pub room_id: String,
    pub game_id: u64,
    pub round: u64,
}

/// Arms a one-shot timer that resolves the tagged round as unchallenged once
/// `timeout` elapses. Never cancelled: a timer for a finished round is a no-op.
#[instrument(skip(service))]
pub fn schedule_challenge_timeout(
    service: RoomService,
    tag: RoundTag,
    timeout: Duration,
) -> JoinHandle<()> {
    debug!(
        room_id = %tag.room_id,
        round = tag.round,
        timeout_secs = timeout.as_secs(),
        "Arming challenge timer"
    );

    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        if let Err(e) = service.resolve_timeout(&tag).await {
            debug!(room_id = %tag.room_id, round = tag.round, error = %e, "Challenge timer dropped");
        }
    })
}
