// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};

/// Canonical boundaries of one week bucket. Buckets are fixed day-of-month
/// ranges 1-7, 8-14, 15-21, 22-end; they reset at every month boundary, so
/// the last bucket spans 7 to 10 days depending on the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekBucket {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Map a date to its containing week bucket. Pure and deterministic:
/// independent of any stored period records. The last bucket's end clamps to
/// the month's actual last day.
pub fn week_bucket_of(date: NaiveDate) -> WeekBucket {
    let (first, last) = match date.day() {
        1..=7 => (1, 7),
        8..=14 => (8, 14),
        15..=21 => (15, 21),
        _ => (22, days_in_month(date.year(), date.month())),
    };
    // Both days are valid for this year/month by construction.
    let start = NaiveDate::from_ymd_opt(date.year(), date.month(), first).unwrap_or(date);
    let end = NaiveDate::from_ymd_opt(date.year(), date.month(), last).unwrap_or(date);
    WeekBucket { start, end }
}

/// End date of the bucket that starts at `start_date`. Periods only store
/// their start; the end is always re-derived.
pub fn bucket_end_of(start_date: NaiveDate) -> NaiveDate {
    week_bucket_of(start_date).end
}
