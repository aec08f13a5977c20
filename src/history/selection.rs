use chrono::NaiveDate;
use tracing::debug;

/// What the user asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKey {
    Day(NaiveDate),
    Weeks { first: NaiveDate, second: NaiveDate },
}

/// Issued for every request, handed back with its result.
#[derive(Debug)]
pub struct RequestTicket {
    key: HistoryKey,
}

impl RequestTicket {
    pub fn key(&self) -> HistoryKey {
        self.key
    }
}

/// Keeps the currently shown history result. Requests can't be cancelled, so a result that
/// arrives after the user moved on to another date or range is discarded instead.
#[derive(Debug)]
pub struct HistorySelection<T> {
    latest: Option<HistoryKey>,
    shown: Option<T>,
}

impl<T> Default for HistorySelection<T> {
    fn default() -> Self {
        Self {
            latest: None,
            shown: None,
        }
    }
}

impl<T> HistorySelection<T> {
    /// Marks `key` as the relevant request and clears whatever was shown.
    pub fn begin(&mut self, key: HistoryKey) -> RequestTicket {
        self.latest = Some(key);
        self.shown = None;
        RequestTicket { key }
    }

    /// Stores `value` if its request is still the relevant one. Returns whether it was stored.
    pub fn complete(&mut self, ticket: RequestTicket, value: T) -> bool {
        if self.latest != Some(ticket.key) {
            debug!("Discarding stale result for {:?}", ticket.key);
            return false;
        }
        self.shown = Some(value);
        true
    }

    pub fn latest(&self) -> Option<HistoryKey> {
        self.latest
    }

    pub fn shown(&self) -> Option<&T> {
        self.shown.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.latest.is_some() && self.shown.is_none()
    }
}
