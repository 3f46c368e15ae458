// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Data-access layer over SQLite: the transaction store, the period store,
//! and the identity provider. The engine never touches this module; commands
//! read snapshots here, compute, then write results back.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::models::{Balances, Period, Template, Transaction, TransactionKind};
use crate::utils::parse_date;

// ---- identity -------------------------------------------------------------

/// The current user, from settings. Mutations must resolve this before any
/// write; a missing row is a fatal `Unauthorized`.
pub fn current_user_id(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='current_user'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    v.ok_or_else(|| CoreError::Unauthorized.into())
}

pub fn set_current_user(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('current_user', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![name],
    )?;
    Ok(())
}

/// Display currency label. Pure presentation; no conversion anywhere.
pub fn get_display_currency(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='display_currency'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| "USD".to_string()))
}

pub fn set_display_currency(conn: &Connection, ccy: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('display_currency', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![ccy],
    )?;
    Ok(())
}

// ---- transactions ---------------------------------------------------------

fn transaction_from_row(
    id: i64,
    user_id: String,
    period_id: i64,
    kind: String,
    title: String,
    amount: String,
    date: String,
    date_created: String,
) -> Result<Transaction> {
    Ok(Transaction {
        id,
        user_id,
        period_id,
        kind: TransactionKind::parse(&kind)?,
        title,
        amount: amount
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in transactions", amount))?,
        date: parse_date(&date)?,
        date_created,
    })
}

const TX_COLS: &str = "id, user_id, period_id, kind, title, amount, date, created_at";

pub fn fetch_transactions(conn: &Connection, user_id: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLS} FROM transactions WHERE user_id=?1 ORDER BY date, id"
    ))?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(transaction_from_row(
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
        )?);
    }
    Ok(out)
}

pub fn fetch_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let mut stmt = conn.prepare(&format!("SELECT {TX_COLS} FROM transactions WHERE id=?1"))?;
    let row = stmt
        .query_row(params![id], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, String>(5)?,
                r.get::<_, String>(6)?,
                r.get::<_, String>(7)?,
            ))
        })
        .with_context(|| format!("Transaction {} not found", id))?;
    transaction_from_row(
        row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7,
    )
}

/// Insert and return the stored row (id and created_at come from SQLite).
pub fn insert_transaction(
    conn: &Connection,
    user_id: &str,
    period_id: i64,
    kind: TransactionKind,
    title: &str,
    amount: Decimal,
    date: chrono::NaiveDate,
) -> Result<Transaction> {
    conn.execute(
        "INSERT INTO transactions(user_id, period_id, kind, title, amount, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            period_id,
            kind.as_str(),
            title,
            amount.to_string(),
            date.to_string()
        ],
    )?;
    fetch_transaction(conn, conn.last_insert_rowid())
}

pub fn update_transaction_title(conn: &Connection, id: i64, title: &str) -> Result<()> {
    let n = conn.execute(
        "UPDATE transactions SET title=?2 WHERE id=?1",
        params![id, title],
    )?;
    anyhow::ensure!(n == 1, "Transaction {} not found", id);
    Ok(())
}

pub fn update_transaction_amount_kind(
    conn: &Connection,
    id: i64,
    amount: Decimal,
    kind: TransactionKind,
) -> Result<()> {
    let n = conn.execute(
        "UPDATE transactions SET amount=?2, kind=?3 WHERE id=?1",
        params![id, amount.to_string(), kind.as_str()],
    )?;
    anyhow::ensure!(n == 1, "Transaction {} not found", id);
    Ok(())
}

pub fn update_transaction_date(
    conn: &Connection,
    id: i64,
    date: chrono::NaiveDate,
    period_id: i64,
) -> Result<()> {
    let n = conn.execute(
        "UPDATE transactions SET date=?2, period_id=?3 WHERE id=?1",
        params![id, date.to_string(), period_id],
    )?;
    anyhow::ensure!(n == 1, "Transaction {} not found", id);
    Ok(())
}

/// Insert-or-replace by id; used when a rebuild rewrites period assignments.
pub fn upsert_transaction(conn: &Connection, tx: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, user_id, period_id, kind, title, amount, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
           period_id=excluded.period_id, kind=excluded.kind, title=excluded.title,
           amount=excluded.amount, date=excluded.date",
        params![
            tx.id,
            tx.user_id,
            tx.period_id,
            tx.kind.as_str(),
            tx.title,
            tx.amount.to_string(),
            tx.date.to_string(),
            tx.date_created,
        ],
    )?;
    Ok(())
}

pub fn delete_transactions(conn: &Connection, ids: &[i64]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let placeholders = vec!["?"; ids.len()].join(",");
    let sql = format!("DELETE FROM transactions WHERE id IN ({})", placeholders);
    let params: Vec<&dyn rusqlite::ToSql> =
        ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();
    let n = conn.execute(&sql, rusqlite::params_from_iter(params))?;
    Ok(n)
}

// ---- periods --------------------------------------------------------------

fn period_from_row(
    id: i64,
    user_id: String,
    start_date: String,
    cols: [String; 6],
) -> Result<Period> {
    let dec = |s: &String| -> Result<Decimal> {
        s.parse::<Decimal>()
            .with_context(|| format!("Invalid balance '{}' in periods", s))
    };
    Ok(Period {
        id,
        user_id,
        start_date: parse_date(&start_date)?,
        start: Balances {
            balance: dec(&cols[0])?,
            stock: dec(&cols[2])?,
            forward_payments: dec(&cols[4])?,
        },
        end: Balances {
            balance: dec(&cols[1])?,
            stock: dec(&cols[3])?,
            forward_payments: dec(&cols[5])?,
        },
    })
}

const PERIOD_COLS: &str = "id, user_id, start_date, balance_start, balance_end, \
     stock_start, stock_end, forward_payments_start, forward_payments_end";

pub fn fetch_periods(conn: &Connection, user_id: &str) -> Result<Vec<Period>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PERIOD_COLS} FROM periods WHERE user_id=?1 ORDER BY start_date"
    ))?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(period_from_row(
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            [
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
                r.get(7)?,
                r.get(8)?,
            ],
        )?);
    }
    Ok(out)
}

/// Insert a freshly seeded period; the returned value carries the rowid the
/// store assigned. Dependent writes (attaching a transaction) must only
/// happen after this succeeds.
pub fn insert_period(conn: &Connection, p: &Period) -> Result<Period> {
    conn.execute(
        "INSERT INTO periods(user_id, start_date, balance_start, balance_end,
             stock_start, stock_end, forward_payments_start, forward_payments_end)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            p.user_id,
            p.start_date.to_string(),
            p.start.balance.to_string(),
            p.end.balance.to_string(),
            p.start.stock.to_string(),
            p.end.stock.to_string(),
            p.start.forward_payments.to_string(),
            p.end.forward_payments.to_string(),
        ],
    )?;
    let mut stored = p.clone();
    stored.id = conn.last_insert_rowid();
    Ok(stored)
}

pub fn upsert_periods(conn: &Connection, periods: &[Period]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO periods(id, user_id, start_date, balance_start, balance_end,
             stock_start, stock_end, forward_payments_start, forward_payments_end)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
           start_date=excluded.start_date,
           balance_start=excluded.balance_start, balance_end=excluded.balance_end,
           stock_start=excluded.stock_start, stock_end=excluded.stock_end,
           forward_payments_start=excluded.forward_payments_start,
           forward_payments_end=excluded.forward_payments_end",
    )?;
    for p in periods {
        stmt.execute(params![
            p.id,
            p.user_id,
            p.start_date.to_string(),
            p.start.balance.to_string(),
            p.end.balance.to_string(),
            p.start.stock.to_string(),
            p.end.stock.to_string(),
            p.start.forward_payments.to_string(),
            p.end.forward_payments.to_string(),
        ])?;
    }
    Ok(())
}

/// Full rebuild: drop the user's periods and write the derived set with its
/// engine-assigned ids, atomically.
pub fn replace_periods(conn: &mut Connection, user_id: &str, periods: &[Period]) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM periods WHERE user_id=?1", params![user_id])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO periods(id, user_id, start_date, balance_start, balance_end,
                 stock_start, stock_end, forward_payments_start, forward_payments_end)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for p in periods {
            stmt.execute(params![
                p.id,
                p.user_id,
                p.start_date.to_string(),
                p.start.balance.to_string(),
                p.end.balance.to_string(),
                p.start.stock.to_string(),
                p.end.stock.to_string(),
                p.start.forward_payments.to_string(),
                p.end.forward_payments.to_string(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ---- templates ------------------------------------------------------------

pub fn fetch_templates(conn: &Connection, user_id: &str) -> Result<Vec<Template>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, title, kind, amount FROM templates
         WHERE user_id=?1 ORDER BY name",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let kind: String = r.get(4)?;
        let amount: String = r.get(5)?;
        out.push(Template {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            title: r.get(3)?,
            kind: TransactionKind::parse(&kind)?,
            amount: amount
                .parse::<Decimal>()
                .with_context(|| format!("Invalid amount '{}' in templates", amount))?,
        });
    }
    Ok(out)
}

pub fn find_template(conn: &Connection, user_id: &str, name: &str) -> Result<Template> {
    fetch_templates(conn, user_id)?
        .into_iter()
        .find(|t| t.name == name)
        .with_context(|| format!("Template '{}' not found", name))
}

pub fn insert_template(
    conn: &Connection,
    user_id: &str,
    name: &str,
    title: &str,
    kind: TransactionKind,
    amount: Decimal,
) -> Result<()> {
    conn.execute(
        "INSERT INTO templates(user_id, name, title, kind, amount)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, name) DO UPDATE SET
           title=excluded.title, kind=excluded.kind, amount=excluded.amount",
        params![user_id, name, title, kind.as_str(), amount.to_string()],
    )?;
    Ok(())
}

pub fn delete_template(conn: &Connection, user_id: &str, name: &str) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM templates WHERE user_id=?1 AND name=?2",
        params![user_id, name],
    )?;
    anyhow::ensure!(n == 1, "Template '{}' not found", name);
    Ok(())
}
