// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use weekflow::engine::calendar::week_bucket_of;
use weekflow::engine::derive::{derive_initial_periods, seed_for_bucket};
use weekflow::error::CoreError;
use weekflow::models::{Balances, Transaction, TransactionKind};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(id: i64, kind: TransactionKind, amount: i64, date: &str) -> Transaction {
    Transaction {
        id,
        user_id: "u1".into(),
        period_id: 0,
        kind,
        title: format!("tx{}", id),
        amount: Decimal::from(amount),
        date: d(date),
        date_created: String::new(),
    }
}

#[test]
fn category_effects_accumulate_within_one_period() {
    // payment 100 -> balance -100; income/stock 50 -> stock 50;
    // compensation/stock 20 -> stock 30, balance -80
    let txs = vec![
        tx(1, TransactionKind::PaymentFixed, 100, "2025-03-03"),
        tx(2, TransactionKind::IncomeStock, 50, "2025-03-04"),
        tx(3, TransactionKind::CompensationStock, 20, "2025-03-05"),
    ];
    let (periods, assigned) = derive_initial_periods(txs, "u1");
    assert_eq!(periods.len(), 1);
    let p = &periods[0];
    assert_eq!(p.start_date, d("2025-03-01"));
    assert_eq!(p.start, Balances::ZERO);
    assert_eq!(p.end.balance, Decimal::from(-80));
    assert_eq!(p.end.stock, Decimal::from(30));
    assert_eq!(p.end.forward_payments, Decimal::ZERO);
    assert!(assigned.iter().all(|t| t.period_id == p.id));
}

#[test]
fn forward_payment_cycle() {
    let txs = vec![
        tx(1, TransactionKind::IncomeForwardPayment, 200, "2025-06-02"),
        tx(2, TransactionKind::CompensationForwardPayment, 80, "2025-06-03"),
    ];
    let (periods, _) = derive_initial_periods(txs, "u1");
    assert_eq!(periods[0].end.forward_payments, Decimal::from(120));
    assert_eq!(periods[0].end.balance, Decimal::from(80));
}

#[test]
fn chain_invariant_holds_across_buckets_and_months() {
    let txs = vec![
        tx(1, TransactionKind::IncomeProfit, 1000, "2025-01-05"),
        tx(2, TransactionKind::PaymentVariable, 300, "2025-01-18"),
        tx(3, TransactionKind::PaymentFixed, 100, "2025-01-25"),
        tx(4, TransactionKind::IncomeProfit, 50, "2025-02-02"),
    ];
    let (periods, _) = derive_initial_periods(txs, "u1");
    assert_eq!(periods.len(), 4);
    for pair in periods.windows(2) {
        assert_eq!(pair[1].start, pair[0].end);
    }
    assert_eq!(periods[0].end.balance, Decimal::from(1000));
    assert_eq!(periods[3].end.balance, Decimal::from(650));
}

#[test]
fn unsorted_input_is_sorted_by_date() {
    let txs = vec![
        tx(1, TransactionKind::PaymentFixed, 10, "2025-02-10"),
        tx(2, TransactionKind::IncomeProfit, 100, "2025-01-02"),
    ];
    let (periods, assigned) = derive_initial_periods(txs, "u1");
    assert_eq!(periods[0].start_date, d("2025-01-01"));
    assert_eq!(periods[1].start_date, d("2025-02-08"));
    // First period seeds at zero, second carries the income forward
    assert_eq!(periods[1].start.balance, Decimal::from(100));
    assert_eq!(periods[1].end.balance, Decimal::from(90));
    // The earlier-dated transaction owns the earlier period
    assert_eq!(assigned[0].id, 2);
    assert_eq!(assigned[0].period_id, periods[0].id);
}

#[test]
fn period_ids_are_sequential_from_one() {
    let txs = vec![
        tx(1, TransactionKind::IncomeProfit, 1, "2025-01-02"),
        tx(2, TransactionKind::IncomeProfit, 1, "2025-01-09"),
        tx(3, TransactionKind::IncomeProfit, 1, "2025-01-16"),
    ];
    let (periods, _) = derive_initial_periods(txs, "u1");
    let ids: Vec<i64> = periods.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn seed_for_bucket_uses_latest_preceding_period() {
    let txs = vec![
        tx(1, TransactionKind::IncomeProfit, 100, "2025-01-02"),
        tx(2, TransactionKind::IncomeProfit, 50, "2025-01-10"),
    ];
    let (periods, _) = derive_initial_periods(txs, "u1");
    let bucket = week_bucket_of(d("2025-01-20"));
    assert_eq!(
        seed_for_bucket(&periods, &bucket).balance,
        Decimal::from(150)
    );
    // Nothing precedes the very first bucket
    let first_bucket = week_bucket_of(d("2024-12-03"));
    assert_eq!(seed_for_bucket(&periods, &first_bucket), Balances::ZERO);
}

#[test]
fn unknown_kind_string_is_a_fatal_error() {
    let err = TransactionKind::parse("bogus/type").unwrap_err();
    assert_eq!(err, CoreError::UnknownTransactionType("bogus/type".into()));
    // And every known wire form round-trips
    for kind in TransactionKind::ALL {
        assert_eq!(TransactionKind::parse(kind.as_str()).unwrap(), kind);
    }
}

#[test]
fn kind_serializes_as_its_wire_form() {
    assert_eq!(
        serde_json::to_string(&TransactionKind::PaymentFixed).unwrap(),
        "\"payment/fixed\""
    );
    for kind in TransactionKind::ALL {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.as_str()));
        let back: TransactionKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
