use std::sync::Arc;

use serde::Serialize;

use crate::{tasks::Task, utils::time::seconds_to_hours};

use super::RangeSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPoint {
    pub label: Arc<str>,
    pub seconds: u64,
    pub hours: f64,
}

/// One point per task, in task order.
pub fn day_series(tasks: &[Task]) -> Vec<DayPoint> {
    tasks
        .iter()
        .map(|task| DayPoint {
            label: task.name.clone(),
            seconds: task.time as u64,
            hours: seconds_to_hours(task.time as u64),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    ProductiveHours,
    ScreenTimeHours,
    CompletionPercent,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::ProductiveHours,
        Metric::ScreenTimeHours,
        Metric::CompletionPercent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::ProductiveHours => "Productive (h)",
            Metric::ScreenTimeHours => "Screen time (h)",
            Metric::CompletionPercent => "Completion (%)",
        }
    }

    pub fn value_of(&self, summary: &RangeSummary) -> f64 {
        match self {
            Metric::ProductiveHours => seconds_to_hours(summary.productive_time),
            Metric::ScreenTimeHours => seconds_to_hours(summary.screen_time),
            Metric::CompletionPercent => *summary.completion_rate as f64,
        }
    }
}

/// A metric with one value per compared period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: Metric,
    pub values: Vec<f64>,
}

/// Metric-by-metric series over independently computed summaries. Summaries are paired, never
/// merged.
pub fn comparison_series(periods: &[RangeSummary]) -> Vec<MetricSeries> {
    Metric::ALL
        .into_iter()
        .map(|metric| MetricSeries {
            metric,
            values: periods.iter().map(|v| metric.value_of(v)).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{summary::RangeSummary, tasks::Task, utils::percentage::Percentage};

    use super::{comparison_series, day_series, Metric, MetricSeries};

    #[test]
    fn day_series_follows_task_order() {
        let tasks = [Task::screen_time(1800), Task::new("Read").with_time(7200)];
        let series = day_series(&tasks);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label.as_ref(), "Screen time");
        assert_eq!(series[0].hours, 0.5);
        assert_eq!(series[1].seconds, 7200);
        assert_eq!(series[1].hours, 2.);
    }

    #[test]
    fn comparison_has_three_metrics_per_period() {
        let first = RangeSummary {
            productive_time: 36_000,
            screen_time: 9000,
            completion_rate: Percentage::new_opt(75).unwrap(),
        };
        let second = RangeSummary {
            productive_time: 5400,
            screen_time: 0,
            completion_rate: Percentage::ZERO,
        };
        assert_eq!(
            comparison_series(&[first, second]),
            vec![
                MetricSeries {
                    metric: Metric::ProductiveHours,
                    values: vec![10., 1.5]
                },
                MetricSeries {
                    metric: Metric::ScreenTimeHours,
                    values: vec![2.5, 0.]
                },
                MetricSeries {
                    metric: Metric::CompletionPercent,
                    values: vec![75., 0.]
                },
            ]
        );
    }
}
