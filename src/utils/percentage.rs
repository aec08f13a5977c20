use std::{fmt::Display, ops::Deref};

use serde::Serialize;

/// Whole percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);

    pub fn new_opt(value: u8) -> Option<Percentage> {
        if value > 100 {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// `round(100 * part / whole)`, or zero when `whole` is zero. `part` above `whole` saturates
    /// at 100.
    pub fn of_ratio(part: usize, whole: usize) -> Percentage {
        if whole == 0 {
            return Percentage::ZERO;
        }
        let part = part.min(whole);
        let rounded = (part as f64 * 100. / whole as f64).round();
        Percentage(rounded as u8)
    }
}

impl Deref for Percentage {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Percentage;

    #[test]
    fn ratio_rounds_half_up() {
        assert_eq!(*Percentage::of_ratio(1, 3), 33);
        assert_eq!(*Percentage::of_ratio(2, 3), 67);
        assert_eq!(*Percentage::of_ratio(1, 8), 13);
    }

    #[test]
    fn ratio_of_empty_whole_is_zero() {
        assert_eq!(Percentage::of_ratio(0, 0), Percentage::ZERO);
        assert_eq!(Percentage::of_ratio(5, 0), Percentage::ZERO);
    }

    #[test]
    fn new_rejects_values_above_hundred() {
        assert!(Percentage::new_opt(100).is_some());
        assert!(Percentage::new_opt(101).is_none());
        assert_eq!(Percentage::of_ratio(4, 4).to_string(), "100%");
    }
}
