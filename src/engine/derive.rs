// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::calendar::{week_bucket_of, WeekBucket};
use crate::models::{Balances, Period, Transaction};

/// Build the full period list from scratch and annotate every transaction
/// with its owning period id.
///
/// Transactions are stable-sorted by date (original order breaks ties) and
/// walked in order: each lands in the accumulating period for its week
/// bucket, or opens a new period seeded from the previous period's end
/// totals (zero for the very first). Period ids are assigned sequentially
/// from 1; the caller owns the table during a rebuild.
pub fn derive_initial_periods(
    transactions: Vec<Transaction>,
    user_id: &str,
) -> (Vec<Period>, Vec<Transaction>) {
    let mut txs = transactions;
    txs.sort_by(|a, b| a.date.cmp(&b.date));

    let mut periods: Vec<Period> = Vec::new();
    for tx in txs.iter_mut() {
        let bucket = week_bucket_of(tx.date);
        match periods.iter_mut().find(|p| p.start_date == bucket.start) {
            Some(p) => {
                p.end += tx.kind.effect(tx.amount);
                tx.period_id = p.id;
            }
            None => {
                // Sorted input: a new bucket always opens after every
                // existing one, so the seed is simply the last period's end.
                let seed = periods.last().map(|p| p.end).unwrap_or(Balances::ZERO);
                let id = periods.len() as i64 + 1;
                let mut p = seed_period(id, user_id, &bucket, seed);
                p.end += tx.kind.effect(tx.amount);
                tx.period_id = id;
                periods.push(p);
            }
        }
    }
    (periods, txs)
}

/// Single-period constructor: a fresh bucket whose start and end both equal
/// the seed totals (the preceding period's end, or zero).
pub fn seed_period(id: i64, user_id: &str, bucket: &WeekBucket, seed: Balances) -> Period {
    Period {
        id,
        user_id: user_id.to_string(),
        start_date: bucket.start,
        start: seed,
        end: seed,
    }
}

/// Seed totals for a new period at `bucket`: the end of the latest existing
/// period that starts before it, or zero when none precedes it.
pub fn seed_for_bucket(periods: &[Period], bucket: &WeekBucket) -> Balances {
    periods
        .iter()
        .filter(|p| p.start_date < bucket.start)
        .max_by_key(|p| p.start_date)
        .map(|p| p.end)
        .unwrap_or(Balances::ZERO)
}
