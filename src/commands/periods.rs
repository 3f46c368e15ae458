// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::calendar::bucket_end_of;
use crate::engine::delta::shift_all;
use crate::engine::derive::derive_initial_periods;
use crate::models::Balances;
use crate::store;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rebuild", _)) => rebuild(conn)?,
        Some(("set-start", sub)) => set_start(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct PeriodRow {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub balance_start: String,
    pub balance_end: String,
    pub stock_start: String,
    pub stock_end: String,
    pub forward_payments_start: String,
    pub forward_payments_end: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let periods = store::fetch_periods(conn, &user)?;
    let data: Vec<PeriodRow> = periods
        .iter()
        .map(|p| PeriodRow {
            id: p.id,
            start_date: p.start_date.to_string(),
            end_date: bucket_end_of(p.start_date).to_string(),
            balance_start: p.start.balance.to_string(),
            balance_end: p.end.balance.to_string(),
            stock_start: p.start.stock.to_string(),
            stock_end: p.end.stock.to_string(),
            forward_payments_start: p.start.forward_payments.to_string(),
            forward_payments_end: p.end.forward_payments.to_string(),
        })
        .collect();

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    format!("{} .. {}", r.start_date, r.end_date),
                    format!("{} -> {}", r.balance_start, r.balance_end),
                    format!("{} -> {}", r.stock_start, r.stock_end),
                    format!("{} -> {}", r.forward_payments_start, r.forward_payments_end),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Week", "Balance", "Stock", "Forward"], rows)
        );
    }
    Ok(())
}

/// Cold-start derivation: wipe the user's periods and re-derive everything
/// from the transaction history.
fn rebuild(conn: &mut Connection) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let txs = store::fetch_transactions(conn, &user)?;
    let (periods, assigned) = derive_initial_periods(txs, &user);
    store::replace_periods(conn, &user, &periods)?;
    for tx in &assigned {
        store::upsert_transaction(conn, tx)?;
    }
    println!(
        "Rebuilt {} period(s) from {} transaction(s)",
        periods.len(),
        assigned.len()
    );
    Ok(())
}

/// Global start-balance edit: shift every period's start and end by the
/// difference against the chronologically first period.
fn set_start(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let periods = store::fetch_periods(conn, &user)?;
    let first = periods
        .iter()
        .min_by_key(|p| p.start_date)
        .context("No periods exist yet")?;

    let field = |name: &str, current: Decimal| -> Result<Decimal> {
        match sub.get_one::<String>(name) {
            Some(s) => parse_decimal(s.trim()),
            None => Ok(current),
        }
    };
    let new_first_start = Balances {
        balance: field("balance", first.start.balance)?,
        stock: field("stock", first.start.stock)?,
        forward_payments: field("forward", first.start.forward_payments)?,
    };

    let shifted = shift_all(&periods, new_first_start);
    store::upsert_periods(conn, &shifted)?;
    println!(
        "Opening balance set to {} / stock {} / forward {} ({} period(s) shifted)",
        new_first_start.balance,
        new_first_start.stock,
        new_first_start.forward_payments,
        shifted.len()
    );
    Ok(())
}
