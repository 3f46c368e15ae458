// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::calendar::week_bucket_of;
use crate::engine::delta::{plan_date_change, reapply_effect, reverse_deletions, DateChange};
use crate::engine::derive::{seed_for_bucket, seed_period};
use crate::engine::recalc::{recalculate, RecalcRequest};
use crate::models::{Period, TransactionKind, MAX_AMOUNT};
use crate::store;
use crate::utils::{maybe_print_json, parse_amount, parse_date, pretty_table, validate_title};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("duplicate", sub)) => duplicate(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("delete", sub)) => delete(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Period covering `date`, reusing an existing bucket or inserting a fresh
/// one seeded from the chronologically preceding period's end totals.
fn owning_period_for(conn: &Connection, user_id: &str, date: NaiveDate) -> Result<Period> {
    let periods = store::fetch_periods(conn, user_id)?;
    let bucket = week_bucket_of(date);
    if let Some(p) = periods.iter().find(|p| p.start_date == bucket.start) {
        return Ok(p.clone());
    }
    let seed = seed_for_bucket(&periods, &bucket);
    store::insert_period(conn, &seed_period(0, user_id, &bucket, seed))
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;

    let template = match sub.get_one::<String>("template") {
        Some(name) => Some(store::find_template(conn, &user, name.trim())?),
        None => None,
    };
    let title = match sub.get_one::<String>("title") {
        Some(t) => t.trim().to_string(),
        None => template
            .as_ref()
            .map(|t| t.title.clone())
            .context("--title is required without --template")?,
    };
    let kind = match sub.get_one::<String>("kind") {
        Some(k) => TransactionKind::parse(k.trim())?,
        None => template
            .as_ref()
            .map(|t| t.kind)
            .context("--kind is required without --template")?,
    };
    let amount = match sub.get_one::<String>("amount") {
        Some(a) => parse_amount(a, MAX_AMOUNT)?,
        None => template
            .as_ref()
            .map(|t| t.amount)
            .context("--amount is required without --template")?,
    };
    validate_title(&title)?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d.trim())?,
        None => chrono::Local::now().date_naive(),
    };

    // Period write first; the transaction is only attached once its period
    // exists and carries the new effect.
    let mut period = owning_period_for(conn, &user, date)?;
    period.end += kind.effect(amount);
    store::upsert_periods(conn, std::slice::from_ref(&period))?;
    let tx = store::insert_transaction(conn, &user, period.id, kind, &title, amount, date)?;

    println!(
        "Recorded {} '{}' {} on {} (period starting {})",
        tx.kind.as_str(),
        tx.title,
        tx.amount,
        tx.date,
        period.start_date
    );
    Ok(())
}

fn duplicate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let id: i64 = sub.get_one::<String>("id").map(|s| s.parse()).transpose()?.context("id required")?;
    let src = store::fetch_transaction(conn, id)?;
    anyhow::ensure!(src.user_id == user, "Transaction {} belongs to another user", id);

    let periods = store::fetch_periods(conn, &user)?;
    let mut period = periods
        .iter()
        .find(|p| p.id == src.period_id)
        .cloned()
        .with_context(|| format!("Period {} for transaction {} not found", src.period_id, id))?;

    let title = format!("{} copy", src.title);
    period.end += src.kind.effect(src.amount);
    store::upsert_periods(conn, std::slice::from_ref(&period))?;
    let tx = store::insert_transaction(
        conn, &user, period.id, src.kind, &title, src.amount, src.date,
    )?;
    println!("Duplicated {} as {} '{}'", id, tx.id, tx.title);
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let id: i64 = sub.get_one::<String>("id").map(|s| s.parse()).transpose()?.context("id required")?;
    let tx = store::fetch_transaction(conn, id)?;
    anyhow::ensure!(tx.user_id == user, "Transaction {} belongs to another user", id);

    if let Some(title) = sub.get_one::<String>("title") {
        let title = title.trim();
        validate_title(title)?;
        // Title carries no balance effect; a store update is the whole edit.
        store::update_transaction_title(conn, id, title)?;
        println!("Title of {} set to '{}'", id, title);
    }

    let new_amount = sub
        .get_one::<String>("amount")
        .map(|a| parse_amount(a, MAX_AMOUNT))
        .transpose()?;
    let new_kind = sub
        .get_one::<String>("kind")
        .map(|k| TransactionKind::parse(k.trim()))
        .transpose()?;
    if new_amount.is_some() || new_kind.is_some() {
        edit_amount_kind(conn, &user, id, new_amount, new_kind)?;
    }

    if let Some(d) = sub.get_one::<String>("date") {
        edit_date(conn, &user, id, parse_date(d.trim())?)?;
    }
    Ok(())
}

fn edit_amount_kind(
    conn: &Connection,
    user: &str,
    id: i64,
    new_amount: Option<Decimal>,
    new_kind: Option<TransactionKind>,
) -> Result<()> {
    let old = store::fetch_transaction(conn, id)?;
    let mut new = old.clone();
    if let Some(a) = new_amount {
        new.amount = a;
    }
    if let Some(k) = new_kind {
        new.kind = k;
    }

    let periods = store::fetch_periods(conn, user)?;
    let period = periods
        .iter()
        .find(|p| p.id == old.period_id)
        .with_context(|| format!("Period {} for transaction {} not found", old.period_id, id))?;

    let adjusted = reapply_effect(period, &old, &new);
    store::upsert_periods(conn, std::slice::from_ref(&adjusted))?;
    store::update_transaction_amount_kind(conn, id, new.amount, new.kind)?;

    // Later periods' starts must cascade from the owning period.
    recalc_and_store(conn, user, &RecalcRequest::Anchor(old.period_id))?;
    println!(
        "Updated {} to {} {}",
        id,
        new.kind.as_str(),
        new.amount
    );
    Ok(())
}

fn edit_date(conn: &Connection, user: &str, id: i64, new_date: NaiveDate) -> Result<()> {
    let tx = store::fetch_transaction(conn, id)?;
    let periods = store::fetch_periods(conn, user)?;
    let old_period = periods
        .iter()
        .find(|p| p.id == tx.period_id)
        .with_context(|| format!("Period {} for transaction {} not found", tx.period_id, id))?;

    match plan_date_change(&periods, &tx, new_date) {
        DateChange::SamePeriod => {
            store::update_transaction_date(conn, id, new_date, tx.period_id)?;
            println!("Moved {} to {} (same period)", id, new_date);
        }
        DateChange::Reassign {
            period_id,
            original_start,
        } => {
            // The snapshot is only a known-good start for the old period;
            // when the move goes backward the walk begins at the target
            // period, whose recorded start must stand.
            let target_start_date = periods
                .iter()
                .find(|p| p.id == period_id)
                .map(|p| p.start_date);
            let override_start = match target_start_date {
                Some(d) if d < old_period.start_date => None,
                _ => Some(original_start),
            };
            store::update_transaction_date(conn, id, new_date, period_id)?;
            recalc_and_store(
                conn,
                user,
                &RecalcRequest::Span {
                    anchor: tx.period_id,
                    new_anchor: period_id,
                    original_start: override_start,
                },
            )?;
            println!("Moved {} to {} (period {})", id, new_date, period_id);
        }
        DateChange::CreatePeriod { bucket, seed } => {
            let override_start = if bucket.start < old_period.start_date {
                None
            } else {
                Some(old_period.start)
            };
            // The period insert must succeed before the transaction points
            // at its id.
            let created = store::insert_period(conn, &seed_period(0, user, &bucket, seed))?;
            store::update_transaction_date(conn, id, new_date, created.id)?;
            recalc_and_store(
                conn,
                user,
                &RecalcRequest::Span {
                    anchor: tx.period_id,
                    new_anchor: created.id,
                    original_start: override_start,
                },
            )?;
            println!(
                "Moved {} to {} (new period starting {})",
                id, new_date, created.start_date
            );
        }
    }
    Ok(())
}

fn delete(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let ids: Vec<i64> = sub
        .get_many::<String>("ids")
        .context("ids required")?
        .map(|s| s.parse::<i64>().with_context(|| format!("Invalid id '{}'", s)))
        .collect::<Result<_>>()?;

    let mut deleted = Vec::new();
    for id in &ids {
        let tx = store::fetch_transaction(conn, *id)?;
        anyhow::ensure!(tx.user_id == user, "Transaction {} belongs to another user", id);
        deleted.push(tx);
    }

    let periods = store::fetch_periods(conn, &user)?;
    let (touched, anchor) = reverse_deletions(&periods, &deleted);
    store::upsert_periods(conn, &touched)?;
    let n = store::delete_transactions(conn, &ids)?;
    if let Some(anchor) = anchor {
        recalc_and_store(conn, &user, &RecalcRequest::Anchor(anchor))?;
    }
    println!("Deleted {} transaction(s)", n);
    Ok(())
}

/// Fetch fresh snapshots, run the orchestrator, upsert the recomputed tail.
fn recalc_and_store(conn: &Connection, user: &str, request: &RecalcRequest) -> Result<()> {
    let periods = store::fetch_periods(conn, user)?;
    let transactions = store::fetch_transactions(conn, user)?;
    let recomputed = recalculate(&periods, &transactions, request)?;
    store::upsert_periods(conn, &recomputed)?;
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub title: String,
    pub amount: String,
    pub period_start: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let ccy = store::get_display_currency(conn)?;

    let periods = store::fetch_periods(conn, &user)?;
    let mut txs = store::fetch_transactions(conn, &user)?;
    if let Some(month) = sub.get_one::<String>("month") {
        txs.retain(|t| t.date.format("%Y-%m").to_string() == *month);
    }
    txs.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txs.truncate(*limit);
    }

    let data: Vec<TransactionRow> = txs
        .iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.as_str().to_string(),
            title: t.title.clone(),
            amount: crate::utils::fmt_money(&t.amount, &ccy),
            period_start: periods
                .iter()
                .find(|p| p.id == t.period_id)
                .map(|p| p.start_date.to_string())
                .unwrap_or_default(),
        })
        .collect();

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.title.clone(),
                    r.amount.clone(),
                    r.period_start.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Date", "Kind", "Title", "Amount", "Period"], rows)
        );
    }
    Ok(())
}
