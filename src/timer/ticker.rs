use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::utils::clock::Clock;

use super::TimerTick;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle of a spawned tick loop. The loop stops as soon as the handle is cancelled or dropped.
pub struct TickerHandle {
    cancel: CancellationToken,
}

impl TickerHandle {
    /// Spawns a loop sending a [TimerTick] tagged with `generation` every [TICK_PERIOD]. The first
    /// tick comes one full period after spawning.
    pub fn spawn(
        sender: mpsc::Sender<TimerTick>,
        clock: Arc<dyn Clock>,
        generation: u64,
    ) -> Self {
        let cancel = CancellationToken::new();
        tokio::spawn(run(sender, clock, generation, cancel.clone()));
        Self { cancel }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    sender: mpsc::Sender<TimerTick>,
    clock: Arc<dyn Clock>,
    generation: u64,
    cancel: CancellationToken,
) {
    debug!("Ticker {generation} started");
    let mut tick_point = clock.instant();
    loop {
        tick_point += TICK_PERIOD;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = clock.sleep_until(tick_point) => (),
        }

        trace!("Ticker {generation} fired");
        // Receiver gone means the session was torn down.
        if sender.send(TimerTick { generation }).await.is_err() {
            break;
        }
    }
    debug!("Ticker {generation} stopped");
}
