pub mod blocker;
pub mod config;
pub mod journal;
pub mod notes;
pub mod reading;
pub mod serve;
pub mod stats;
pub mod text;

use chrono::{Local, NaiveDate};

/// `--date` if given, otherwise today in local time.
pub(crate) fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}
