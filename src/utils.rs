// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::models::{TITLE_MAX_LEN, TITLE_MIN_LEN};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parse and validate a transaction amount: non-negative, at most `max`.
pub fn parse_amount(s: &str, max: i64) -> Result<Decimal> {
    let d = parse_decimal(s.trim())?;
    if d.is_sign_negative() {
        anyhow::bail!("Amount must be non-negative, got {}", d);
    }
    if d > Decimal::from(max) {
        anyhow::bail!("Amount {} exceeds the maximum of {}", d, max);
    }
    Ok(d)
}

pub fn validate_title(title: &str) -> Result<()> {
    let n = title.chars().count();
    if n < TITLE_MIN_LEN || n > TITLE_MAX_LEN {
        anyhow::bail!(
            "Title must be {}-{} characters, got {}",
            TITLE_MIN_LEN,
            TITLE_MAX_LEN,
            n
        );
    }
    Ok(())
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
