//! Single active timer.
//!
//! [TimerEngine] is a state machine over [TimerState]. While it is running (and armed, see
//! [TimerEngine::set_ready]) a [ticker::TickerHandle] sends one [TimerTick] per second into a
//! channel. The owner of the registry drains that channel and hands each tick back to
//! [TimerEngine::apply_tick], so ticks go through the same queue as user edits.
//!
//! Every schedule change bumps a generation counter. Ticks carry the generation they were
//! produced under, which lets ticks still sitting in the channel after a pause or a switch be
//! dropped instead of applied late.

pub mod ticker;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, trace};

use crate::{
    tasks::{registry::TaskRegistry, TaskError},
    utils::clock::Clock,
};

use ticker::TickerHandle;

const TICK_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TimerError {
    #[error("no timer is active")]
    NoActiveTimer,
    #[error(transparent)]
    Task(#[from] TaskError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running(Arc<str>),
    Paused(Arc<str>),
}

impl TimerState {
    pub fn active_task(&self) -> Option<&Arc<str>> {
        match self {
            TimerState::Idle => None,
            TimerState::Running(name) | TimerState::Paused(name) => Some(name),
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TimerState::Paused(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub generation: u64,
}

pub struct TimerEngine {
    state: TimerState,
    ready: bool,
    generation: u64,
    ticker: Option<TickerHandle>,
    sender: mpsc::Sender<TimerTick>,
    clock: Arc<dyn Clock>,
}

impl TimerEngine {
    /// Creates an idle, unarmed engine together with the receiving end of its ticks.
    pub fn channel(clock: Arc<dyn Clock>) -> (Self, mpsc::Receiver<TimerTick>) {
        let (sender, receiver) = mpsc::channel(TICK_CHANNEL_SIZE);
        let engine = Self {
            state: TimerState::Idle,
            ready: false,
            generation: 0,
            ticker: None,
            sender,
            clock,
        };
        (engine, receiver)
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn active_task(&self) -> Option<&Arc<str>> {
        self.state.active_task()
    }

    /// Whether `name` is the task the timer is running or paused on.
    pub fn is_active(&self, name: &str) -> bool {
        self.active_task().is_some_and(|v| v.as_ref() == name)
    }

    /// Whether a tick loop is currently scheduled.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Arms or disarms ticking. Until the day's tasks are loaded the engine may change state but
    /// never schedules ticks.
    pub fn set_ready(&mut self, ready: bool) {
        if self.ready != ready {
            self.ready = ready;
            self.reschedule();
        }
    }

    /// Starts `name`, resuming it if it is the paused task. Any other running or paused task is
    /// stopped first.
    pub fn start(&mut self, registry: &TaskRegistry, name: &str) -> Result<(), TimerError> {
        let task = registry
            .get(name)
            .ok_or_else(|| TaskError::NotFound(name.to_string()))?;
        let name = task.name.clone();

        match &self.state {
            TimerState::Running(current) if *current == name => {
                trace!("Timer for {name:?} is already running");
                return Ok(());
            }
            TimerState::Paused(current) if *current == name => {
                info!("Resuming timer for {name:?}");
            }
            TimerState::Running(current) | TimerState::Paused(current) => {
                info!("Switching timer from {current:?} to {name:?}");
            }
            TimerState::Idle => {
                info!("Starting timer for {name:?}");
            }
        }

        self.state = TimerState::Running(name);
        self.reschedule();
        Ok(())
    }

    /// Pauses the running task. Pausing an already paused timer does nothing; pausing with no
    /// active task fails.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        match &self.state {
            TimerState::Idle => Err(TimerError::NoActiveTimer),
            TimerState::Paused(_) => Ok(()),
            TimerState::Running(name) => {
                info!("Pausing timer for {name:?}");
                self.state = TimerState::Paused(name.clone());
                self.reschedule();
                Ok(())
            }
        }
    }

    /// Stops the timer and returns the task it was on. Accumulated time stays with the task.
    pub fn stop(&mut self) -> Option<Arc<str>> {
        let previous = std::mem::take(&mut self.state);
        if let Some(name) = previous.active_task() {
            info!("Stopping timer for {name:?}");
        }
        self.reschedule();
        match previous {
            TimerState::Idle => None,
            TimerState::Running(name) | TimerState::Paused(name) => Some(name),
        }
    }

    /// Applies a tick produced by the ticker: one more second for the running task. Ticks from an
    /// earlier schedule are ignored. Returns the task's new time if the tick was applied.
    pub fn apply_tick(
        &self,
        tick: TimerTick,
        registry: &mut TaskRegistry,
    ) -> Result<Option<u32>, TaskError> {
        if tick.generation != self.generation {
            trace!(
                "Dropping stale tick {} (current {})",
                tick.generation,
                self.generation
            );
            return Ok(None);
        }
        let TimerState::Running(name) = &self.state else {
            trace!("Dropping tick while not running");
            return Ok(None);
        };
        let current = registry
            .get(name)
            .map(|v| v.time)
            .ok_or_else(|| TaskError::NotFound(name.to_string()))?;
        registry.set_time(name, current as i64 + 1).map(Some)
    }

    fn reschedule(&mut self) {
        // Cancels the previous loop.
        self.ticker = None;
        self.generation += 1;
        if self.ready && matches!(self.state, TimerState::Running(_)) {
            self.ticker = Some(TickerHandle::spawn(
                self.sender.clone(),
                self.clock.clone(),
                self.generation,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::sync::mpsc;

    use crate::{
        tasks::{registry::TaskRegistry, TaskError, MAX_TASK_SECONDS},
        utils::{clock::DefaultClock, logging::TEST_LOGGING},
    };

    use super::{TimerEngine, TimerError, TimerState, TimerTick};

    fn setup() -> (TaskRegistry, TimerEngine, mpsc::Receiver<TimerTick>) {
        *TEST_LOGGING;
        let mut registry = TaskRegistry::new();
        registry.add_task("Read").unwrap();
        registry.add_task("Write").unwrap();
        let (timer, ticks) = TimerEngine::channel(Arc::new(DefaultClock));
        (registry, timer, ticks)
    }

    /// Applies every tick already in the channel, returning how many were applied.
    fn drain(
        timer: &TimerEngine,
        ticks: &mut mpsc::Receiver<TimerTick>,
        registry: &mut TaskRegistry,
    ) -> usize {
        let mut applied = 0;
        while let Ok(tick) = ticks.try_recv() {
            if timer.apply_tick(tick, registry).unwrap().is_some() {
                applied += 1;
            }
        }
        applied
    }

    #[test]
    fn transitions() {
        let (registry, mut timer, _ticks) = setup();
        assert_eq!(timer.state(), &TimerState::Idle);

        timer.start(&registry, "read").unwrap();
        assert_eq!(timer.state(), &TimerState::Running("Read".into()));

        timer.pause().unwrap();
        assert_eq!(timer.state(), &TimerState::Paused("Read".into()));
        assert!(timer.state().is_paused());
        timer.pause().unwrap();
        assert_eq!(timer.state(), &TimerState::Paused("Read".into()));

        timer.start(&registry, "Read").unwrap();
        assert_eq!(timer.state(), &TimerState::Running("Read".into()));

        timer.start(&registry, "Write").unwrap();
        assert_eq!(timer.state(), &TimerState::Running("Write".into()));

        timer.pause().unwrap();
        timer.start(&registry, "Read").unwrap();
        assert_eq!(timer.state(), &TimerState::Running("Read".into()));

        assert_eq!(timer.stop().as_deref(), Some("Read"));
        assert_eq!(timer.state(), &TimerState::Idle);
        assert_eq!(timer.stop(), None);
    }

    #[test]
    fn pause_without_timer_fails() {
        let (_registry, mut timer, _ticks) = setup();
        assert_eq!(timer.pause(), Err(TimerError::NoActiveTimer));
    }

    #[test]
    fn start_requires_existing_task() {
        let (registry, mut timer, _ticks) = setup();
        assert_eq!(
            timer.start(&registry, "Nope"),
            Err(TimerError::Task(TaskError::NotFound("Nope".into())))
        );
        assert_eq!(timer.state(), &TimerState::Idle);
    }

    #[test]
    fn unarmed_engine_never_schedules() {
        let (registry, mut timer, _ticks) = setup();
        timer.start(&registry, "Read").unwrap();
        assert!(!timer.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn running_task_gains_a_second_per_tick() {
        let (mut registry, mut timer, mut ticks) = setup();
        timer.set_ready(true);
        timer.start(&registry, "Read").unwrap();
        assert!(timer.is_ticking());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(drain(&timer, &mut ticks, &mut registry), 3);
        assert_eq!(registry.get("Read").unwrap().time, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn arming_late_starts_ticking() {
        let (mut registry, mut timer, mut ticks) = setup();
        timer.start(&registry, "Read").unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(drain(&timer, &mut ticks, &mut registry), 0);

        timer.set_ready(true);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(drain(&timer, &mut ticks, &mut registry), 2);
        assert_eq!(registry.get("Read").unwrap().time, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_drops_queued_ticks_and_does_not_catch_up() {
        let (mut registry, mut timer, mut ticks) = setup();
        timer.set_ready(true);
        timer.start(&registry, "Read").unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        // Two ticks are queued but not yet applied when the pause happens.
        timer.pause().unwrap();
        assert!(!timer.is_ticking());
        assert_eq!(drain(&timer, &mut ticks, &mut registry), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        timer.start(&registry, "Read").unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(drain(&timer, &mut ticks, &mut registry), 1);
        assert_eq!(registry.get("Read").unwrap().time, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_freezes_previous_task() {
        let (mut registry, mut timer, mut ticks) = setup();
        timer.set_ready(true);
        timer.start(&registry, "Read").unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        drain(&timer, &mut ticks, &mut registry);
        timer.start(&registry, "Write").unwrap();

        tokio::time::sleep(Duration::from_millis(4500)).await;
        drain(&timer, &mut ticks, &mut registry);

        assert_eq!(timer.active_task().map(|v| v.as_ref()), Some("Write"));
        assert_eq!(registry.get("Read").unwrap().time, 2);
        assert_eq!(registry.get("Write").unwrap().time, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_edit_moves_the_baseline() {
        let (mut registry, mut timer, mut ticks) = setup();
        timer.set_ready(true);
        timer.start(&registry, "Read").unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        drain(&timer, &mut ticks, &mut registry);
        registry.set_time("Read", 600).unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        drain(&timer, &mut ticks, &mut registry);
        assert_eq!(registry.get("Read").unwrap().time, 601);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_clamp_at_a_full_day() {
        let (mut registry, mut timer, mut ticks) = setup();
        registry.set_time("Read", MAX_TASK_SECONDS as i64 - 1).unwrap();
        timer.set_ready(true);
        timer.start(&registry, "Read").unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        drain(&timer, &mut ticks, &mut registry);
        assert_eq!(registry.get("Read").unwrap().time, MAX_TASK_SECONDS);
        assert_eq!(timer.state(), &TimerState::Running("Read".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_ticking() {
        let (mut registry, mut timer, mut ticks) = setup();
        timer.set_ready(true);
        timer.start(&registry, "Read").unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        timer.stop();
        assert!(!timer.is_ticking());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(drain(&timer, &mut ticks, &mut registry), 0);
        assert_eq!(registry.get("Read").unwrap().time, 0);
    }
}
