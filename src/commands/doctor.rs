// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::engine::calendar::week_bucket_of;
use crate::store;
use crate::utils::pretty_table;

/// Audit the period chain and transaction assignments. Read-only: reports
/// issues, never repairs them ('periods rebuild' is the repair tool).
pub fn handle(conn: &Connection) -> Result<()> {
    let user = store::current_user_id(conn)?;
    let mut periods = store::fetch_periods(conn, &user)?;
    let txs = store::fetch_transactions(conn, &user)?;
    periods.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    let mut rows = Vec::new();

    // 1) Chain breaks: adjacent periods where start != previous end
    for pair in periods.windows(2) {
        if pair[1].start != pair[0].end {
            rows.push(vec![
                "chain_break".into(),
                format!(
                    "period {} starts {:?}, previous ends {:?}",
                    pair[1].id, pair[1].start, pair[0].end
                ),
            ]);
        }
    }

    // 2) Transactions whose period_id resolves to nothing
    for t in &txs {
        if !periods.iter().any(|p| p.id == t.period_id) {
            rows.push(vec![
                "orphan_period_id".into(),
                format!("transaction {} -> period {}", t.id, t.period_id),
            ]);
        }
    }

    // 3) Transactions dated outside their owning period's week bucket
    for t in &txs {
        if let Some(p) = periods.iter().find(|p| p.id == t.period_id) {
            if !week_bucket_of(p.start_date).contains(t.date) {
                rows.push(vec![
                    "date_outside_period".into(),
                    format!("transaction {} dated {} in period {}", t.id, t.date, p.id),
                ]);
            }
        }
    }

    // 4) Empty periods stay in place by design; list them so the state is
    //    visible rather than silent.
    for p in &periods {
        if !txs.iter().any(|t| t.period_id == p.id) {
            rows.push(vec![
                "empty_period".into(),
                format!("period {} starting {}", p.id, p.start_date),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
