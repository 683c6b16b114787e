// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistent settings kept in the `settings` table.

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

pub const RECURRING_ENABLED: &str = "recurring.enabled";
pub const RECURRING_INTERVAL_MINUTES: &str = "recurring.interval_minutes";

/// Known keys with their defaults.
pub const KNOWN: &[(&str, &str)] = &[
    (RECURRING_ENABLED, "true"),
    (RECURRING_INTERVAL_MINUTES, "25"),
];

pub fn get(conn: &Connection, key: &str) -> Result<String> {
    let default = default_for(key)?;
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v.unwrap_or_else(|| default.to_string()))
}

pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    default_for(key)?;
    let value = value.trim();
    validate(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn all(conn: &Connection) -> Result<Vec<(String, String)>> {
    KNOWN
        .iter()
        .map(|(k, _)| Ok((k.to_string(), get(conn, k)?)))
        .collect()
}

pub fn recurring_enabled(conn: &Connection) -> Result<bool> {
    parse_bool(&get(conn, RECURRING_ENABLED)?)
}

pub fn recurring_interval_minutes(conn: &Connection) -> Result<u64> {
    parse_minutes(&get(conn, RECURRING_INTERVAL_MINUTES)?)
}

fn default_for(key: &str) -> Result<&'static str> {
    KNOWN
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, d)| *d)
        .ok_or_else(|| anyhow!("Unknown setting '{}'", key))
}

fn validate(key: &str, value: &str) -> Result<()> {
    match key {
        RECURRING_ENABLED => parse_bool(value).map(|_| ()),
        RECURRING_INTERVAL_MINUTES => parse_minutes(value).map(|_| ()),
        _ => Ok(()),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(anyhow!("Invalid boolean '{}'", other)),
    }
}

fn parse_minutes(value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(anyhow!(
            "Invalid interval '{}', expected a positive number of minutes",
            value
        )),
        Ok(v) => Ok(v),
    }
}
