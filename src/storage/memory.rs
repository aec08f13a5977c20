use std::{
    collections::{HashMap, HashSet},
    io,
    sync::Mutex,
    time::Duration,
};

use chrono::NaiveDate;

use crate::{auth::Credential, tasks::TaskEntity};

use super::{DayStorage, FetchError, SaveError};

/// In-memory [DayStorage] for tests. Dates can be made to fail or to answer late.
#[derive(Default)]
pub struct MemoryStorage {
    days: Mutex<HashMap<NaiveDate, Vec<TaskEntity>>>,
    failing: Mutex<HashSet<NaiveDate>>,
    delays: Mutex<HashMap<NaiveDate, Duration>>,
    save_error: Mutex<Option<SaveError>>,
    seen_credentials: Mutex<Vec<Option<String>>>,
}

impl MemoryStorage {
    pub fn with_day(self, date: NaiveDate, tasks: Vec<TaskEntity>) -> Self {
        self.days.lock().unwrap().insert(date, tasks);
        self
    }

    pub fn failing_on(self, date: NaiveDate) -> Self {
        self.failing.lock().unwrap().insert(date);
        self
    }

    pub fn delayed(self, date: NaiveDate, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(date, delay);
        self
    }

    pub fn failing_saves(self, message: &str) -> Self {
        *self.save_error.lock().unwrap() = Some(SaveError::new(message));
        self
    }

    pub fn day(&self, date: NaiveDate) -> Option<Vec<TaskEntity>> {
        self.days.lock().unwrap().get(&date).cloned()
    }

    pub fn seen_credentials(&self) -> Vec<Option<String>> {
        self.seen_credentials.lock().unwrap().clone()
    }
}

impl DayStorage for MemoryStorage {
    async fn load_day(
        &self,
        date: NaiveDate,
        credential: Option<&Credential>,
    ) -> Result<Vec<TaskEntity>, FetchError> {
        self.seen_credentials
            .lock()
            .unwrap()
            .push(credential.map(|v| v.as_str().to_string()));
        let delay = self.delays.lock().unwrap().get(&date).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&date) {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset").into());
        }
        Ok(self.day(date).unwrap_or_default())
    }

    async fn save_day(
        &self,
        date: NaiveDate,
        credential: &Credential,
        tasks: Vec<TaskEntity>,
    ) -> Result<String, SaveError> {
        self.seen_credentials
            .lock()
            .unwrap()
            .push(Some(credential.as_str().to_string()));
        if let Some(error) = self.save_error.lock().unwrap().clone() {
            return Err(error);
        }
        let count = tasks.len();
        self.days.lock().unwrap().insert(date, tasks);
        Ok(format!("stored {count}"))
    }
}
