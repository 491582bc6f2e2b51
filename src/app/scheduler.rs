use super::registry::RoomRegistry;
use crate::game::constants::TICK_MS;
use crate::game::room::TickOutcome;
use crate::transport::hub::Hub;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub advanced: usize,
    pub ended: usize,
}

/// Fixed-period driver that advances every registered room once per firing.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    registry: Arc<RoomRegistry>,
    hub: Arc<Hub>,
    period: Duration,
}

impl TickScheduler {
    pub fn new(registry: Arc<RoomRegistry>, hub: Arc<Hub>) -> Self {
        Self {
            registry,
            hub,
            period: Duration::from_millis(TICK_MS),
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let summary = self.tick_once().await;
            if summary.ended > 0 {
                tracing::debug!(
                    advanced = summary.advanced,
                    ended = summary.ended,
                    "tick retired finished rooms"
                );
            }
        }
    }

    /// Advances every room concurrently and waits for all of them, so firings
    /// never overlap.
    pub async fn tick_once(&self) -> TickSummary {
        let rooms = self.registry.rooms();
        let outcomes = join_all(rooms.iter().map(|room| room.tick(self.hub.as_ref()))).await;

        let mut summary = TickSummary::default();
        for (room, outcome) in rooms.iter().zip(outcomes) {
            match outcome {
                TickOutcome::Continued => summary.advanced += 1,
                TickOutcome::Ended {
                    result,
                    participants,
                } => {
                    summary.ended += 1;
                    tracing::debug!(
                        room_id = room.room_id(),
                        loser_id = %result.loser_id,
                        "retiring finished room"
                    );
                    self.registry.retire(room);
                    self.hub.release(room.key(), &participants);
                }
                TickOutcome::Closed => {
                    self.registry.retire(room);
                }
            }
        }
        summary
    }
}
