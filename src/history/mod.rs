//! Summaries of past days. A week is seven consecutive days starting at the given date; its
//! summary is computed over all of the week's tasks pooled together, not by averaging daily
//! summaries.

pub mod selection;

use chrono::NaiveDate;
use futures::{stream, StreamExt};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{
    auth::{Credential, CredentialProvider},
    storage::{DayStorage, FetchError},
    summary::{
        chart::{comparison_series, day_series, DayPoint, MetricSeries},
        RangeSummary,
    },
    tasks::Task,
    utils::time::consecutive_days,
};

use selection::HistoryKey;

pub const DAYS_IN_WEEK: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    pub summary: RangeSummary,
    pub chart: Vec<DayPoint>,
    /// The fetch failed and the day is shown as empty.
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tasks: Vec<Task>,
    pub summary: RangeSummary,
    /// Days whose fetch failed and contributed nothing.
    pub failed_days: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekComparison {
    pub first: WeekReport,
    pub second: WeekReport,
    pub chart: Vec<MetricSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HistoryView {
    Day(DayReport),
    Weeks(WeekComparison),
}

pub struct HistoryRangeFetcher<S, A> {
    storage: S,
    credentials: A,
}

impl<S: DayStorage, A: CredentialProvider> HistoryRangeFetcher<S, A> {
    pub fn new(storage: S, credentials: A) -> Self {
        Self {
            storage,
            credentials,
        }
    }

    async fn fetch_day(
        &self,
        date: NaiveDate,
        credential: Option<&Credential>,
    ) -> Result<Vec<Task>, FetchError> {
        let records = self.storage.load_day(date, credential).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn day(&self, date: NaiveDate) -> DayReport {
        let credential = self.credentials.credential();
        let (tasks, failed) = match self.fetch_day(date, credential.as_ref()).await {
            Ok(tasks) => (tasks, false),
            Err(e) => {
                warn!("Failed to load tasks for {date}: {e}");
                (vec![], true)
            }
        };
        DayReport {
            date,
            summary: RangeSummary::from_tasks(&tasks),
            chart: day_series(&tasks),
            tasks,
            failed,
        }
    }

    /// Fetches the seven days starting at `start` concurrently and pools their tasks. A day that
    /// fails to load counts as empty.
    #[instrument(skip(self))]
    pub async fn week(&self, start: NaiveDate) -> WeekReport {
        let credential = self.credentials.credential();
        let credential = credential.as_ref();

        let dates = consecutive_days(start, DAYS_IN_WEEK).collect::<Vec<_>>();
        // Shorter than a week only at the end of the calendar.
        let end = dates.last().copied().unwrap_or(start);

        let mut days = stream::iter(dates)
            .map(|date| async move { (date, self.fetch_day(date, credential).await) })
            .buffer_unordered(DAYS_IN_WEEK as usize)
            .collect::<Vec<_>>()
            .await;
        // Completion order is arbitrary. Pool in date order so reports are stable.
        days.sort_by_key(|(date, _)| *date);

        let mut tasks = Vec::new();
        let mut failed_days = Vec::new();
        for (date, result) in days {
            match result {
                Ok(day) => tasks.extend(day),
                Err(e) => {
                    warn!("Failed to load tasks for {date}, counting it as empty: {e}");
                    failed_days.push(date);
                }
            }
        }
        debug!("Pooled {} tasks", tasks.len());

        WeekReport {
            start,
            end,
            summary: RangeSummary::from_tasks(&tasks),
            tasks,
            failed_days,
        }
    }

    /// Fetches two weeks independently and pairs their summaries metric by metric.
    pub async fn compare_weeks(&self, first: NaiveDate, second: NaiveDate) -> WeekComparison {
        let (first, second) = tokio::join!(self.week(first), self.week(second));
        WeekComparison {
            chart: comparison_series(&[first.summary, second.summary]),
            first,
            second,
        }
    }

    pub async fn fetch(&self, key: HistoryKey) -> HistoryView {
        match key {
            HistoryKey::Day(date) => HistoryView::Day(self.day(date).await),
            HistoryKey::Weeks { first, second } => {
                HistoryView::Weeks(self.compare_weeks(first, second).await)
            }
        }
    }
}
