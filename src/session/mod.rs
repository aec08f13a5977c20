//! Editing session of one day. [DaySession] owns the day's [TaskRegistry] and the
//! [TimerEngine], and is the one place ticks and user edits meet: both arrive through `&mut self`,
//! so they are applied one after another on the same task.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::CredentialProvider,
    storage::{DayStorage, SaveError},
    summary::{
        chart::{day_series, DayPoint},
        Mood, RangeSummary,
    },
    tasks::{registry::TaskRegistry, Task, TaskError},
    timer::{TimerEngine, TimerError, TimerState, TimerTick},
    utils::clock::Clock,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("you must be logged in to save")]
    NotAuthenticated,
    #[error("tasks of {0} could not be loaded, refusing to overwrite them")]
    LoadFailed(NaiveDate),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The day's tasks are not loaded yet. The timer can change state but doesn't tick.
    Loading,
    Ready,
}

pub struct DaySession<S, A> {
    date: NaiveDate,
    storage: S,
    credentials: A,
    registry: TaskRegistry,
    timer: TimerEngine,
    ticks: mpsc::Receiver<TimerTick>,
    phase: SessionPhase,
    load_failed: bool,
}

impl<S: DayStorage, A: CredentialProvider> DaySession<S, A> {
    pub fn new(date: NaiveDate, storage: S, credentials: A, clock: Arc<dyn Clock>) -> Self {
        let (timer, ticks) = TimerEngine::channel(clock);
        Self {
            date,
            storage,
            credentials,
            registry: TaskRegistry::new(),
            timer,
            ticks,
            phase: SessionPhase::Loading,
            load_failed: false,
        }
    }

    /// Session for the clock's current day.
    pub fn today(storage: S, credentials: A, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock.today(), storage, credentials, clock)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The last load degraded to an empty day. The registry doesn't reflect what is stored.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Fails when the last load degraded, so the degraded day isn't saved over the stored one.
    pub fn ensure_loaded(&self) -> Result<(), SessionError> {
        if self.load_failed {
            return Err(SessionError::LoadFailed(self.date));
        }
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        self.registry.tasks()
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn timer_state(&self) -> &TimerState {
        self.timer.state()
    }

    /// Loads the day's snapshot and arms the timer. A failed fetch leaves the day empty (apart
    /// from the fixed task) instead of failing. Returns the number of loaded tasks.
    #[instrument(skip(self), fields(date = %self.date))]
    pub async fn load(&mut self) -> usize {
        self.phase = SessionPhase::Loading;
        self.timer.set_ready(false);

        let credential = self.credentials.credential();
        let records = match self.storage.load_day(self.date, credential.as_ref()).await {
            Ok(records) => {
                self.load_failed = false;
                records
            }
            Err(e) => {
                warn!("Failed to load tasks, starting from an empty day: {e}");
                self.load_failed = true;
                vec![]
            }
        };
        self.registry = TaskRegistry::load(records);

        let orphaned = self
            .timer
            .active_task()
            .is_some_and(|name| self.registry.get(name).is_none());
        if orphaned {
            self.timer.stop();
        }

        self.phase = SessionPhase::Ready;
        self.timer.set_ready(true);
        info!("Loaded {} tasks", self.registry.len());
        self.registry.len()
    }

    pub fn add_task(&mut self, name: &str) -> Result<(), SessionError> {
        self.registry.add_task(name)?;
        Ok(())
    }

    pub fn remove_task(&mut self, name: &str) -> Result<Task, SessionError> {
        Ok(self.registry.remove_task(name, &mut self.timer)?)
    }

    pub fn set_time(&mut self, name: &str, seconds: i64) -> Result<u32, SessionError> {
        Ok(self.registry.set_time(name, seconds)?)
    }

    pub fn toggle_completion(&mut self, name: &str) -> Result<bool, SessionError> {
        Ok(self.registry.toggle_completion(name)?)
    }

    pub fn start(&mut self, name: &str) -> Result<(), SessionError> {
        Ok(self.timer.start(&self.registry, name)?)
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        Ok(self.timer.pause()?)
    }

    pub fn stop(&mut self) -> Option<Arc<str>> {
        self.timer.stop()
    }

    pub fn summary(&self) -> RangeSummary {
        RangeSummary::from_tasks(self.registry.tasks())
    }

    pub fn mood(&self) -> Mood {
        self.summary().mood()
    }

    pub fn day_chart(&self) -> Vec<DayPoint> {
        day_series(self.registry.tasks())
    }

    /// Applies every tick already waiting in the queue. Returns how many changed a task.
    pub fn process_pending(&mut self) -> Result<usize, SessionError> {
        let mut applied = 0;
        while let Ok(tick) = self.ticks.try_recv() {
            if self.timer.apply_tick(tick, &mut self.registry)?.is_some() {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Applies ticks as they come until `cancel` fires. Returns how many ticks changed a task.
    pub async fn run_until(&mut self, cancel: CancellationToken) -> Result<usize, SessionError> {
        let mut applied = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                tick = self.ticks.recv() => {
                    let Some(tick) = tick else {
                        break;
                    };
                    if self.timer.apply_tick(tick, &mut self.registry)?.is_some() {
                        applied += 1;
                    }
                }
            }
        }
        applied += self.process_pending()?;
        debug!("Applied {applied} ticks");
        Ok(applied)
    }

    /// Replaces the stored snapshot with the full current task set. Returns the storage's
    /// acknowledgement.
    #[instrument(skip(self), fields(date = %self.date))]
    pub async fn save(&self) -> Result<String, SessionError> {
        let Some(credential) = self.credentials.credential() else {
            return Err(SessionError::NotAuthenticated);
        };
        let message = self
            .storage
            .save_day(self.date, &credential, self.registry.to_entities())
            .await
            .inspect_err(|e| error!("Saving failed: {e}"))?;
        info!("{message}");
        Ok(message)
    }
}
