//! Storage of day snapshots.
//!
//!  - A snapshot is the full ordered task list of one calendar date.
//!  - Snapshots are always replaced as a whole; there is no partial update.
//!  - [json_storage::JsonDayStorage] keeps one JSON document per date in a directory.

pub mod json_storage;
#[cfg(test)]
pub mod memory;

use std::{future::Future, ops::Deref};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{auth::Credential, tasks::TaskEntity};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read tasks: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tasks: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to save. The message is meant to be shown to the user as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SaveError {
    pub message: String,
}

impl SaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Interface for abstracting storage of day snapshots.
pub trait DayStorage {
    /// Retrieves the snapshot stored for `date`. A date with nothing stored is an empty snapshot,
    /// not an error.
    fn load_day(
        &self,
        date: NaiveDate,
        credential: Option<&Credential>,
    ) -> impl Future<Output = Result<Vec<TaskEntity>, FetchError>> + Send;

    /// Replaces the snapshot of `date`. Returns an acknowledgement message.
    fn save_day(
        &self,
        date: NaiveDate,
        credential: &Credential,
        tasks: Vec<TaskEntity>,
    ) -> impl Future<Output = Result<String, SaveError>> + Send;
}

impl<T: Deref> DayStorage for T
where
    T::Target: DayStorage,
{
    fn load_day(
        &self,
        date: NaiveDate,
        credential: Option<&Credential>,
    ) -> impl Future<Output = Result<Vec<TaskEntity>, FetchError>> + Send {
        self.deref().load_day(date, credential)
    }

    fn save_day(
        &self,
        date: NaiveDate,
        credential: &Credential,
        tasks: Vec<TaskEntity>,
    ) -> impl Future<Output = Result<String, SaveError>> + Send {
        self.deref().save_day(date, credential, tasks)
    }
}
