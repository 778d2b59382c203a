//! Weekly study statistics, streaks and badges.
//!
//! The week runs Monday to Sunday. Recording into a later week moves the
//! current week to `lastWeekStats` and starts a zeroed one.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;
use crate::storage::{self, KeyValueStore};

pub const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const KEY_WEEKLY: &str = "weeklyStats";
const KEY_LAST_WEEK: &str = "lastWeekStats";
const KEY_WEEK_START: &str = "statsWeekStart";
const KEY_STREAK: &str = "studyStreak";
const KEY_LAST_STUDY: &str = "lastStudyDate";
const KEY_BADGES: &str = "studyBadges";

pub const BADGE_FIRST_SESSION: &str = "🌱 First Session";
pub const BADGE_STREAK_3: &str = "🔥 3-Day Streak";
pub const BADGE_STREAK_7: &str = "🏆 7-Day Streak";
pub const BADGE_TEN_HOURS: &str = "⏱️ 10 Hours Focused";
pub const BADGE_THOUSAND_WORDS: &str = "✍️ 1000 Words";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStat {
    pub day: String,
    pub hours: f64,
    pub words: u64,
}

/// A zeroed Monday..Sunday week.
pub fn empty_week() -> Vec<WeeklyStat> {
    DAYS.iter()
        .map(|day| WeeklyStat {
            day: (*day).to_string(),
            hours: 0.0,
            words: 0,
        })
        .collect()
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub weekly_stats: Vec<WeeklyStat>,
    pub last_week_stats: Vec<WeeklyStat>,
    pub best_day: String,
    pub streak: u32,
    pub badges: Vec<String>,
    pub comparison: String,
    pub insights: Vec<String>,
}

struct Weeks {
    start: NaiveDate,
    current: Vec<WeeklyStat>,
    last: Vec<WeeklyStat>,
}

pub struct StudyStats<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> StudyStats<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Add focused minutes to `date`'s weekday. Returns newly earned badges.
    pub fn record_focus(&self, date: NaiveDate, minutes: u32) -> Result<Vec<String>, StorageError> {
        self.record(date, |stat| stat.hours += f64::from(minutes) / 60.0, minutes > 0)
    }

    /// Add written words to `date`'s weekday. Returns newly earned badges.
    pub fn record_words(&self, date: NaiveDate, words: u64) -> Result<Vec<String>, StorageError> {
        self.record(date, |stat| stat.words += words, false)
    }

    pub fn streak(&self) -> Result<u32, StorageError> {
        Ok(storage::load(self.store, KEY_STREAK)?.unwrap_or(0))
    }

    pub fn badges(&self) -> Result<Vec<String>, StorageError> {
        Ok(storage::load(self.store, KEY_BADGES)?.unwrap_or_default())
    }

    /// Read-only view for `today`. A stale week is shown as already rolled
    /// over, and a streak whose last study day is before yesterday shows 0.
    pub fn summary(&self, today: NaiveDate) -> Result<StatsSummary, StorageError> {
        let weeks = self.weeks(today)?;
        let last_study: Option<NaiveDate> = storage::load(self.store, KEY_LAST_STUDY)?;
        let streak = match last_study {
            Some(d) if d >= today - Duration::days(1) => self.streak()?,
            _ => 0,
        };

        let this_total: f64 = weeks.current.iter().map(|s| s.hours).sum();
        let last_total: f64 = weeks.last.iter().map(|s| s.hours).sum();
        let comparison = if this_total > last_total {
            format!(
                "You studied {:.1} hours more than last week 🎉",
                this_total - last_total
            )
        } else if this_total < last_total {
            format!(
                "You studied {:.1} hours less than last week.",
                last_total - this_total
            )
        } else {
            "You studied the same as last week.".to_string()
        };

        let best_day = best_day(&weeks.current).to_string();
        let insights = vec![
            format!("You study best on {best_day}s, keep it up!"),
            format!(
                "Average daily focus: {:.0} minutes.",
                this_total / 7.0 * 60.0
            ),
        ];

        Ok(StatsSummary {
            weekly_stats: weeks.current,
            last_week_stats: weeks.last,
            best_day,
            streak,
            badges: self.badges()?,
            comparison,
            insights,
        })
    }

    fn weeks(&self, date: NaiveDate) -> Result<Weeks, StorageError> {
        let target = week_start(date);
        let stored_start: Option<NaiveDate> = storage::load(self.store, KEY_WEEK_START)?;
        let current: Vec<WeeklyStat> = storage::load(self.store, KEY_WEEKLY)?
            .filter(|w: &Vec<WeeklyStat>| w.len() == DAYS.len())
            .unwrap_or_else(empty_week);
        let last: Vec<WeeklyStat> = storage::load(self.store, KEY_LAST_WEEK)?
            .filter(|w: &Vec<WeeklyStat>| w.len() == DAYS.len())
            .unwrap_or_else(empty_week);

        Ok(match stored_start {
            Some(start) if start < target => Weeks {
                start: target,
                last: if start + Duration::days(7) == target {
                    current
                } else {
                    empty_week()
                },
                current: empty_week(),
            },
            Some(start) => Weeks {
                start,
                current,
                last,
            },
            None => Weeks {
                start: target,
                current,
                last,
            },
        })
    }

    fn record(
        &self,
        date: NaiveDate,
        apply: impl FnOnce(&mut WeeklyStat),
        focused: bool,
    ) -> Result<Vec<String>, StorageError> {
        let mut weeks = self.weeks(date)?;
        let idx = date.weekday().num_days_from_monday() as usize;
        let target = week_start(date);
        if target == weeks.start {
            apply(&mut weeks.current[idx]);
        } else if target + Duration::days(7) == weeks.start {
            apply(&mut weeks.last[idx]);
        } else {
            debug!(%date, "ignoring study record older than last week");
            return Ok(Vec::new());
        }

        let (streak, last_study) = self.next_streak(date)?;
        let mut badges = self.badges()?;
        let before = badges.len();
        let week_hours: f64 = weeks.current.iter().map(|s| s.hours).sum();
        let week_words: u64 = weeks.current.iter().map(|s| s.words).sum();
        let earned = [
            (focused, BADGE_FIRST_SESSION),
            (streak >= 3, BADGE_STREAK_3),
            (streak >= 7, BADGE_STREAK_7),
            (week_hours >= 10.0, BADGE_TEN_HOURS),
            (week_words >= 1000, BADGE_THOUSAND_WORDS),
        ];
        for (ok, badge) in earned {
            if ok && !badges.iter().any(|b| b == badge) {
                badges.push(badge.to_string());
            }
        }

        self.store.set_many(&[
            (KEY_WEEK_START, to_json(&weeks.start)),
            (KEY_WEEKLY, to_json(&weeks.current)),
            (KEY_LAST_WEEK, to_json(&weeks.last)),
            (KEY_BADGES, to_json(&badges)),
            (KEY_STREAK, streak.into()),
            (KEY_LAST_STUDY, to_json(&last_study)),
        ])?;
        Ok(badges.split_off(before))
    }

    /// Streak and last study day after studying on `date`.
    fn next_streak(&self, date: NaiveDate) -> Result<(u32, NaiveDate), StorageError> {
        let last: Option<NaiveDate> = storage::load(self.store, KEY_LAST_STUDY)?;
        let streak = self.streak()?;
        Ok(match last {
            Some(d) if d == date => (streak.max(1), d),
            Some(d) if d + Duration::days(1) == date => (streak + 1, date),
            Some(d) if d > date => (streak, d),
            _ => (1, date),
        })
    }
}

/// First day with the most hours; Monday when the week is empty.
pub fn best_day(week: &[WeeklyStat]) -> &str {
    let mut best: Option<&WeeklyStat> = None;
    for stat in week {
        if best.map_or(true, |b| stat.hours > b.hours) {
            best = Some(stat);
        }
    }
    best.map_or(DAYS[0], |s| s.day.as_str())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
