// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use weekflow::{cli, commands, db, store};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("user", sub)) => match sub.subcommand() {
            Some(("set", s)) => {
                if let Some(name) = s.get_one::<String>("name") {
                    store::set_current_user(&conn, name.trim())?;
                    println!("Active user set to '{}'", name.trim());
                }
            }
            Some(("show", _)) => {
                println!("{}", store::current_user_id(&conn)?);
            }
            Some(("currency", s)) => {
                if let Some(code) = s.get_one::<String>("code") {
                    store::set_display_currency(&conn, &code.trim().to_uppercase())?;
                    println!("Display currency set to {}", code.trim().to_uppercase());
                }
            }
            _ => {}
        },
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("periods", sub)) => commands::periods::handle(&mut conn, sub)?,
        Some(("template", sub)) => commands::templates::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
