// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Incremental period adjustments. Each procedure is a pure function over
//! in-memory snapshots and yields candidate periods to upsert; none of them
//! touches storage. Cascading of later periods' start totals is the
//! recalculation orchestrator's job.

use chrono::NaiveDate;

use crate::engine::calendar::{week_bucket_of, WeekBucket};
use crate::engine::derive::seed_for_bucket;
use crate::models::{Balances, Period, Transaction};

/// Global start-balance edit: shift the whole timeline so the first period
/// opens at `new_first_start`. Every period's start and end move by the same
/// difference; the edit never changes any period's net flow.
pub fn shift_all(periods: &[Period], new_first_start: Balances) -> Vec<Period> {
    let mut sorted = periods.to_vec();
    sorted.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    let Some(first) = sorted.first() else {
        return Vec::new();
    };
    let difference = first.start - new_first_start;
    sorted
        .into_iter()
        .map(|mut p| {
            p.start -= difference;
            p.end -= difference;
            p
        })
        .collect()
}

/// Amount/kind change within one period: reverse the old effect on the
/// owning period's end and apply the new one. Later periods cascade via
/// recalculation anchored here.
pub fn reapply_effect(period: &Period, old: &Transaction, new: &Transaction) -> Period {
    let mut p = period.clone();
    p.end = p.end - old.kind.effect(old.amount) + new.kind.effect(new.amount);
    p
}

/// Deletion: add back each deleted transaction's effect on its owning
/// period's end. Returns only the touched periods, plus the id of the
/// earliest one as the recalculation anchor.
pub fn reverse_deletions(
    periods: &[Period],
    deleted: &[Transaction],
) -> (Vec<Period>, Option<i64>) {
    let mut touched: Vec<Period> = Vec::new();
    for tx in deleted {
        if let Some(p) = touched.iter_mut().find(|p| p.id == tx.period_id) {
            p.end -= tx.kind.effect(tx.amount);
        } else if let Some(p) = periods.iter().find(|p| p.id == tx.period_id) {
            let mut p = p.clone();
            p.end -= tx.kind.effect(tx.amount);
            touched.push(p);
        }
    }
    let anchor = touched
        .iter()
        .min_by_key(|p| p.start_date)
        .map(|p| p.id);
    (touched, anchor)
}

/// Outcome of a date edit, decided against the current period snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateChange {
    /// New date stays inside the owning period's bucket; no period work.
    SamePeriod,
    /// An existing period covers the new date. `original_start` snapshots the
    /// old period's start before reassignment, for the recalculation anchor.
    Reassign {
        period_id: i64,
        original_start: Balances,
    },
    /// No period covers the new date; create one seeded from the end of the
    /// chronologically preceding period.
    CreatePeriod { bucket: WeekBucket, seed: Balances },
}

/// Decide how a transaction's date change maps onto periods.
///
/// When several periods could cover the new date, the one with the latest
/// `start_date` wins (find-last semantics, matching the bucket layout where
/// at most one period per bucket exists per user).
pub fn plan_date_change(
    periods: &[Period],
    tx: &Transaction,
    new_date: NaiveDate,
) -> DateChange {
    if let Some(owning) = periods.iter().find(|p| p.id == tx.period_id) {
        if week_bucket_of(owning.start_date).contains(new_date) {
            return DateChange::SamePeriod;
        }
        let mut sorted = periods.to_vec();
        sorted.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        if let Some(target) = sorted
            .iter()
            .rev()
            .find(|p| week_bucket_of(p.start_date).contains(new_date))
        {
            return DateChange::Reassign {
                period_id: target.id,
                original_start: owning.start,
            };
        }
        let bucket = week_bucket_of(new_date);
        let seed = seed_for_bucket(periods, &bucket);
        return DateChange::CreatePeriod { bucket, seed };
    }
    // Unknown owning period: treat as an uncovered week so the caller can
    // re-anchor through period creation.
    let bucket = week_bucket_of(new_date);
    let seed = seed_for_bucket(periods, &bucket);
    DateChange::CreatePeriod { bucket, seed }
}
