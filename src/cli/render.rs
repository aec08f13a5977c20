use ansi_term::Colour;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    auth::CredentialProvider,
    history::{DayReport, HistoryView, WeekComparison, WeekReport},
    session::DaySession,
    storage::DayStorage,
    summary::{Mood, RangeSummary},
    tasks::Task,
    timer::TimerState,
    utils::time::{date_to_record_name, format_duration},
};

#[derive(Serialize)]
struct DayOutput<'a> {
    date: NaiveDate,
    tasks: &'a [Task],
    summary: RangeSummary,
    mood: Mood,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn paint_mood(mood: Mood) -> String {
    let colour = match mood {
        Mood::Super => Colour::Green,
        Mood::Happy => Colour::Cyan,
        Mood::Tired => Colour::Yellow,
        Mood::Sad => Colour::Red,
    };
    colour.bold().paint(mood.label()).to_string()
}

fn timer_label(timer: &TimerState, task: &Task) -> &'static str {
    match timer.active_task() {
        Some(name) if task.is_named(name) && timer.is_paused() => "\t(paused)",
        Some(name) if task.is_named(name) => "\t(running)",
        _ => "",
    }
}

fn print_tasks(tasks: &[Task], timer: &TimerState) {
    for task in tasks {
        let mark = match (task.fixed, task.completed) {
            (true, _) => "*",
            (false, true) => "x",
            (false, false) => " ",
        };
        let label = timer_label(timer, task);
        println!(
            "[{mark}]\t{}\t{}{label}",
            format_duration(task.time as u64),
            task.name
        );
    }
}

fn print_summary(summary: &RangeSummary) {
    println!(
        "Productive\t{}\nScreen time\t{}\nCompleted\t{}\nMood\t\t{}",
        format_duration(summary.productive_time),
        format_duration(summary.screen_time),
        summary.completion_rate,
        paint_mood(summary.mood()),
    );
}

pub fn print_session<S: DayStorage, A: CredentialProvider>(
    session: &DaySession<S, A>,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(&DayOutput {
            date: session.date(),
            tasks: session.tasks(),
            summary: session.summary(),
            mood: session.mood(),
        });
    }
    println!("{}", date_to_record_name(session.date()));
    if session.load_failed() {
        println!("Something went wrong loading tasks.");
    }
    print_tasks(session.tasks(), session.timer_state());
    println!();
    print_summary(&session.summary());
    Ok(())
}

fn print_day(report: &DayReport) {
    println!("{}", date_to_record_name(report.date));
    if report.failed {
        println!("Something went wrong loading tasks.");
    } else if report.tasks.is_empty() {
        println!("No tasks recorded for this day.");
    } else {
        print_tasks(&report.tasks, &TimerState::Idle);
    }
    println!();
    print_summary(&report.summary);
}

fn print_week_text(report: &WeekReport) {
    println!(
        "{} - {}",
        date_to_record_name(report.start),
        date_to_record_name(report.end)
    );
    for date in &report.failed_days {
        println!("Failed to load {}, counted as empty", date_to_record_name(*date));
    }
    print_summary(&report.summary);
}

fn print_comparison(comparison: &WeekComparison) {
    print_week_text(&comparison.first);
    println!();
    print_week_text(&comparison.second);
    println!();
    for series in &comparison.chart {
        let values = series
            .values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\t");
        println!("{}\t{values}", series.metric.label());
    }
}

pub fn print_week(report: &WeekReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    print_week_text(report);
    Ok(())
}

pub fn print_history(view: &HistoryView, json: bool) -> Result<()> {
    if json {
        return print_json(view);
    }
    match view {
        HistoryView::Day(report) => print_day(report),
        HistoryView::Weeks(comparison) => print_comparison(comparison),
    }
    Ok(())
}
