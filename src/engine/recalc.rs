// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cascading re-derivation of period totals from an anchor forward.
//!
//! Every period's end is recomputed from the transactions currently assigned
//! to it, never by applying a numeric delta to the previous value. That makes
//! recalculation idempotent: running it twice over the same snapshot yields
//! identical output, with no compounding drift.

use crate::error::CoreError;
use crate::models::{Balances, Period, Transaction};

/// What to recalculate. Exactly one of: a single anchor period, or the
/// old/new period pair of a cross-boundary date move, optionally carrying the
/// old period's pre-mutation start totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecalcRequest {
    Anchor(i64),
    Span {
        anchor: i64,
        new_anchor: i64,
        original_start: Option<Balances>,
    },
}

impl RecalcRequest {
    fn anchor_ids(&self) -> (i64, Option<i64>) {
        match self {
            RecalcRequest::Anchor(id) => (*id, None),
            RecalcRequest::Span {
                anchor, new_anchor, ..
            } => (*anchor, Some(*new_anchor)),
        }
    }

    fn original_start(&self) -> Option<Balances> {
        match self {
            RecalcRequest::Anchor(_) => None,
            RecalcRequest::Span { original_start, .. } => *original_start,
        }
    }
}

/// Walk all periods from the earliest anchor forward, re-deriving start/end
/// totals. The first walked period keeps its recorded start (or the explicit
/// override); every later period's start is the previous period's freshly
/// recomputed end. Returns only the recomputed periods, in ascending
/// `start_date` order; callers upsert them all.
pub fn recalculate(
    periods: &[Period],
    transactions: &[Transaction],
    request: &RecalcRequest,
) -> Result<Vec<Period>, CoreError> {
    let mut sorted = periods.to_vec();
    sorted.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    let (anchor, new_anchor) = request.anchor_ids();
    let start_idx = sorted
        .iter()
        .position(|p| p.id == anchor || Some(p.id) == new_anchor)
        .ok_or(CoreError::AnchorNotFound(anchor))?;

    let mut out: Vec<Period> = Vec::with_capacity(sorted.len() - start_idx);
    for p in sorted.iter().skip(start_idx) {
        let mut period = p.clone();
        period.start = match out.last() {
            Some(prev) => prev.end,
            None => request.original_start().unwrap_or(period.start),
        };
        period.end = period.start + period_flow(transactions, period.id);
        out.push(period);
    }
    Ok(out)
}

/// Net effect of all transactions currently assigned to `period_id`.
pub fn period_flow(transactions: &[Transaction], period_id: i64) -> Balances {
    transactions
        .iter()
        .filter(|t| t.period_id == period_id)
        .fold(Balances::ZERO, |acc, t| acc + t.kind.effect(t.amount))
}
