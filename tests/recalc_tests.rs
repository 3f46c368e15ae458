// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use weekflow::engine::delta::reverse_deletions;
use weekflow::engine::derive::derive_initial_periods;
use weekflow::engine::recalc::{period_flow, recalculate, RecalcRequest};
use weekflow::error::CoreError;
use weekflow::models::{Balances, Period, Transaction, TransactionKind};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn bal(b: i64, s: i64, f: i64) -> Balances {
    Balances {
        balance: Decimal::from(b),
        stock: Decimal::from(s),
        forward_payments: Decimal::from(f),
    }
}

fn tx(id: i64, period_id: i64, kind: TransactionKind, amount: i64, date: &str) -> Transaction {
    Transaction {
        id,
        user_id: "u1".into(),
        period_id,
        kind,
        title: format!("tx{}", id),
        amount: Decimal::from(amount),
        date: d(date),
        date_created: String::new(),
    }
}

/// Three periods with one transaction each, derived from scratch.
fn fixture() -> (Vec<Period>, Vec<Transaction>) {
    let txs = vec![
        tx(1, 0, TransactionKind::IncomeProfit, 1000, "2025-01-02"),
        tx(2, 0, TransactionKind::PaymentFixed, 200, "2025-01-10"),
        tx(3, 0, TransactionKind::IncomeStock, 50, "2025-01-17"),
    ];
    derive_initial_periods(txs, "u1")
}

#[test]
fn recalculation_restores_the_chain_after_an_amount_change() {
    let (periods, mut txs) = fixture();
    // The payment in period 2 grows from 200 to 500
    txs[1].amount = Decimal::from(500);

    let out = recalculate(&periods, &txs, &RecalcRequest::Anchor(2)).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, 2);
    assert_eq!(out[0].start.balance, Decimal::from(1000));
    assert_eq!(out[0].end.balance, Decimal::from(500));
    assert_eq!(out[1].start.balance, Decimal::from(500));
    assert_eq!(out[1].end.stock, Decimal::from(50));

    for pair in out.windows(2) {
        assert_eq!(pair[1].start, pair[0].end);
    }
}

#[test]
fn recalculation_is_idempotent() {
    let (mut periods, txs) = fixture();
    let first = recalculate(&periods, &txs, &RecalcRequest::Anchor(1)).unwrap();
    // Apply the first pass, then run again over the updated snapshot
    for p in &first {
        if let Some(slot) = periods.iter_mut().find(|q| q.id == p.id) {
            *slot = p.clone();
        }
    }
    let second = recalculate(&periods, &txs, &RecalcRequest::Anchor(1)).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.start, b.start);
        assert_eq!(a.end, b.end);
    }
}

#[test]
fn add_then_delete_restores_every_period_exactly() {
    let (mut periods, mut txs) = fixture();
    let before = periods.clone();

    // Add a payment to period 2 the way the add path does: bump the owning
    // period's end, append the transaction
    let added = tx(99, 2, TransactionKind::PaymentVariable, 75, "2025-01-12");
    if let Some(p) = periods.iter_mut().find(|p| p.id == 2) {
        p.end += added.kind.effect(added.amount);
    }
    txs.push(added.clone());
    let recomputed = recalculate(&periods, &txs, &RecalcRequest::Anchor(2)).unwrap();
    for p in &recomputed {
        if let Some(slot) = periods.iter_mut().find(|q| q.id == p.id) {
            *slot = p.clone();
        }
    }

    // Delete it again
    let (touched, anchor) = reverse_deletions(&periods, &[added]);
    for p in &touched {
        if let Some(slot) = periods.iter_mut().find(|q| q.id == p.id) {
            *slot = p.clone();
        }
    }
    txs.retain(|t| t.id != 99);
    let recomputed = recalculate(&periods, &txs, &RecalcRequest::Anchor(anchor.unwrap())).unwrap();
    for p in &recomputed {
        if let Some(slot) = periods.iter_mut().find(|q| q.id == p.id) {
            *slot = p.clone();
        }
    }

    for (a, b) in before.iter().zip(periods.iter()) {
        assert_eq!(a.start, b.start, "period {} start drifted", a.id);
        assert_eq!(a.end, b.end, "period {} end drifted", a.id);
    }
}

#[test]
fn span_request_walks_from_the_earliest_of_both_anchors() {
    let (periods, mut txs) = fixture();
    // Move the stock income from period 3 back into period 1
    txs[2].period_id = 1;
    txs[2].date = d("2025-01-03");

    let out = recalculate(
        &periods,
        &txs,
        &RecalcRequest::Span {
            anchor: 3,
            new_anchor: 1,
            original_start: Some(bal(0, 0, 0)),
        },
    )
    .unwrap();
    // Walk covers the whole timeline starting at period 1
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].id, 1);
    assert_eq!(out[0].start, bal(0, 0, 0));
    assert_eq!(out[0].end.stock, Decimal::from(50));
    // Emptied period 3 keeps start == end
    assert_eq!(out[2].start, out[2].end);
}

#[test]
fn original_start_override_applies_only_to_the_first_period() {
    let (periods, txs) = fixture();
    let out = recalculate(
        &periods,
        &txs,
        &RecalcRequest::Span {
            anchor: 2,
            new_anchor: 2,
            original_start: Some(bal(400, 0, 0)),
        },
    )
    .unwrap();
    assert_eq!(out[0].start.balance, Decimal::from(400));
    assert_eq!(out[0].end.balance, Decimal::from(200));
    // The next period cascades from the recomputed end, not from any override
    assert_eq!(out[1].start.balance, Decimal::from(200));
}

#[test]
fn stale_anchor_is_fatal() {
    let (periods, txs) = fixture();
    let err = recalculate(&periods, &txs, &RecalcRequest::Anchor(999)).unwrap_err();
    assert_eq!(err, CoreError::AnchorNotFound(999));
}

#[test]
fn period_flow_sums_only_the_named_period() {
    let (_, txs) = fixture();
    assert_eq!(period_flow(&txs, 1).balance, Decimal::from(1000));
    assert_eq!(period_flow(&txs, 3).stock, Decimal::from(50));
    assert_eq!(period_flow(&txs, 42), Balances::ZERO);
}
