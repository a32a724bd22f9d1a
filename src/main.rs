// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use pocketledger::{cli, commands, db, utils};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("user", sub)) => commands::users::handle(&conn, sub)?,
        Some(("account", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::accounts::handle(&conn, &session, sub)?
        }
        Some(("tx", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::transactions::handle(&mut conn, &session, sub)?
        }
        Some(("expense", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::expenses::handle(&mut conn, &session, sub)?
        }
        Some(("income", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::income::handle(&mut conn, &session, sub)?
        }
        Some(("lend", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::lending::handle(&mut conn, &session, sub)?
        }
        Some(("borrow", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::borrowing::handle(&mut conn, &session, sub)?
        }
        Some(("transfer", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::transfers::handle(&mut conn, &session, sub)?
        }
        Some(("bill", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::bills::handle(&mut conn, &session, sub)?
        }
        Some(("investment", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::investments::handle(&conn, &session, sub)?
        }
        Some(("report", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::reports::handle(&conn, &session, sub)?
        }
        Some(("export", sub)) => {
            let session = utils::current_session(&conn)?;
            commands::exporter::handle(&conn, &session, sub)?
        }
        Some(("doctor", _)) => {
            let session = utils::current_session(&conn)?;
            commands::doctor::handle(&conn, &session)?
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
