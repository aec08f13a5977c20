use chrono::NaiveDate;

pub const SECONDS_IN_HOUR: u64 = 3600;

/// This is the standard way of converting a date to a string in missioncraft.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `count` consecutive calendar days beginning at `start` (inclusive).
pub fn consecutive_days(start: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(count as usize)
}

/// Hour/minute/second decomposition. Always floors, so no seconds are ever rounded away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursMinutesSeconds {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl From<u64> for HoursMinutesSeconds {
    fn from(total: u64) -> Self {
        Self {
            hours: total / SECONDS_IN_HOUR,
            minutes: (total % SECONDS_IN_HOUR) / 60,
            seconds: total % 60,
        }
    }
}

/// Renders seconds as `1h 2m 3s`. Zero hours and minutes are left out, seconds never are.
pub fn format_duration(total: u64) -> String {
    let HoursMinutesSeconds {
        hours,
        minutes,
        seconds,
    } = total.into();
    let mut result = String::new();
    if hours > 0 {
        result.push_str(&format!("{hours}h "));
    }
    if minutes > 0 {
        result.push_str(&format!("{minutes}m "));
    }
    result.push_str(&format!("{seconds}s"));
    result
}

/// Fractional hours rounded to two decimals, used for chart values.
pub fn seconds_to_hours(total: u64) -> f64 {
    let hours = total as f64 / SECONDS_IN_HOUR as f64;
    (hours * 100.).round() / 100.
}
