//! Wall-clock helpers. The association works in local time, so report
//! numbers, upload stamps and retention cutoffs all use `Local`.

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};

/// Current local time truncated to whole seconds
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
