use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tokio::time::Instant;

/// Source of the current calendar day and of tick scheduling. Abstracted so that tests can drive
/// the timer in virtual time and pin "today" to a fixed date.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// The client's local calendar day.
    fn today(&self) -> NaiveDate;

    fn instant(&self) -> Instant;

    async fn sleep(&self, duration: Duration);

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Clock pinned to a single day. Scheduling still goes through tokio time, so paused test
/// runtimes advance it.
#[cfg(test)]
pub struct FixedDayClock(pub NaiveDate);

#[cfg(test)]
#[async_trait]
impl Clock for FixedDayClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
