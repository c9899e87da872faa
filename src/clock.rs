use chrono::{Local, NaiveDate};

/// Source of "today" for calendar-date staleness checks
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the server's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// A cached field needs a refresh when it was never filled, or was last
/// refreshed on a date strictly before today.
pub fn is_stale(has_value: bool, refreshed_on: Option<NaiveDate>, today: NaiveDate) -> bool {
    !has_value || refreshed_on.map_or(true, |date| date < today)
}
