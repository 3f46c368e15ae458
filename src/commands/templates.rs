// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::{TransactionKind, MAX_TEMPLATE_AMOUNT};
use crate::store;
use crate::utils::{maybe_print_json, parse_amount, pretty_table, validate_title};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("remove", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let name = sub.get_one::<String>("name").context("name required")?.trim();
    let title = sub.get_one::<String>("title").context("title required")?.trim();
    let kind = TransactionKind::parse(sub.get_one::<String>("kind").context("kind required")?.trim())?;
    let amount = parse_amount(
        sub.get_one::<String>("amount").context("amount required")?,
        MAX_TEMPLATE_AMOUNT,
    )?;
    validate_title(title)?;
    anyhow::ensure!(!name.is_empty(), "Template name must not be empty");

    store::insert_template(conn, &user, name, title, kind, amount)?;
    println!("Template '{}' saved", name);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let templates = store::fetch_templates(conn, &user)?;
    if !maybe_print_json(json_flag, jsonl_flag, &templates)? {
        let rows: Vec<Vec<String>> = templates
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    t.title.clone(),
                    t.kind.as_str().to_string(),
                    t.amount.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Name", "Title", "Kind", "Amount"], rows));
    }
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let name = sub.get_one::<String>("name").context("name required")?.trim();
    store::delete_template(conn, &user, name)?;
    println!("Template '{}' removed", name);
    Ok(())
}
