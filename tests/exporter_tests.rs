// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use firetrack::{cli, commands::exporter, db};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run_export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "firetrack",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_writes_pretty_json() {
    let conn = base_conn();
    conn.execute(
        "INSERT INTO transactions(owner_id,date,amount,description,category,kind) VALUES \
        (1,'2025-01-02','12.34','[AUTO] Groceries box','Groceries','EXPENSE')",
        [],
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(&conn, "json", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": 1,
                "date": "2025-01-02",
                "owner_id": 1,
                "kind": "EXPENSE",
                "amount": "12.34",
                "category": "Groceries",
                "description": "[AUTO] Groceries box"
            }
        ])
    );
}

#[test]
fn export_transactions_csv_is_oldest_first() {
    let conn = base_conn();
    conn.execute_batch(
        "INSERT INTO transactions(owner_id,date,amount,description,category,kind) VALUES
            (1,'2025-03-01','4000','Salary','Work','INCOME'),
            (1,'2025-01-15','80.10','Power, gas','Utilities','EXPENSE');",
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(&conn, "CSV", &out_str).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["id", "date", "owner_id", "kind", "amount", "category", "description"]
    );
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "2025-01-15");
    assert_eq!(&records[0][6], "Power, gas");
    assert_eq!(&records[1][3], "INCOME");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(run_export(&conn, "xml", &out_str).is_err());
    assert!(!out_path.exists());
}
