// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::engine::{project, project_from};
use crate::models::{FinancialProfile, ProjectionResult, YearlyPoint};
use crate::store;
use crate::utils::{
    fmt_money, maybe_print_json, optional_arg, parse_decimal, parse_rate, pretty_table,
    required_arg,
};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("project", sub)) => project_cmd(sub)?,
        Some(("save", sub)) => save(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn profile_from_args(sub: &clap::ArgMatches) -> Result<FinancialProfile> {
    let age_raw = required_arg(sub, "age")?;
    let current_age = age_raw
        .parse::<i32>()
        .with_context(|| format!("Invalid age '{}'", age_raw))?;
    let target_retirement_age = match optional_arg(sub, "target_age") {
        Some(raw) => Some(
            raw.parse::<i32>()
                .with_context(|| format!("Invalid target age '{}'", raw))?,
        ),
        None => None,
    };
    let annual_contribution_increase_rate = match optional_arg(sub, "contribution_growth") {
        Some(raw) => Some(parse_rate(raw)?),
        None => None,
    };
    Ok(FinancialProfile {
        current_age,
        current_savings: parse_decimal(required_arg(sub, "savings")?)?,
        monthly_contribution: parse_decimal(required_arg(sub, "monthly_contribution")?)?,
        monthly_expenses: parse_decimal(required_arg(sub, "monthly_expenses")?)?,
        expected_return_rate: parse_rate(required_arg(sub, "return_rate")?)?,
        inflation_rate: parse_rate(required_arg(sub, "inflation")?)?,
        safe_withdrawal_rate: parse_rate(required_arg(sub, "swr")?)?,
        target_retirement_age,
        annual_contribution_increase_rate,
    })
}

fn run_projection(profile: &FinancialProfile, sub: &clap::ArgMatches) -> Result<ProjectionResult> {
    let result = match sub.get_one::<i32>("start_year") {
        Some(year) => project_from(profile, *year)?,
        None => project(profile)?,
    };
    Ok(result)
}

fn project_cmd(sub: &clap::ArgMatches) -> Result<()> {
    let profile = profile_from_args(sub)?;
    let result = run_projection(&profile, sub)?;
    print_projection(&result, sub)
}

fn save(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?;
    let profile = profile_from_args(sub)?;
    let stored = store::save_fire_profile(conn, name, &profile)?;
    println!(
        "Saved profile '{}' (FIRE number {})",
        stored.name,
        fmt_money(&stored.fire_number)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profiles = store::list_fire_profiles(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &profiles)? {
        let rows = profiles
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    p.profile.current_age.to_string(),
                    fmt_money(&p.profile.current_savings),
                    fmt_money(&p.profile.monthly_contribution),
                    fmt_money(&p.profile.monthly_expenses),
                    fmt_money(&p.fire_number),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Age", "Savings", "Monthly In", "Monthly Out", "FIRE Number"],
                rows
            )
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?;
    let stored = store::get_fire_profile(conn, name)?;
    let result = run_projection(&stored.profile, sub)?;
    print_projection(&result, sub)
}

fn print_projection(result: &ProjectionResult, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(path) = optional_arg(sub, "csv") {
        write_points_csv(path, &result.yearly_points)?;
        eprintln!("Wrote {} yearly points to {}", result.yearly_points.len(), path);
    }
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), result)? {
        return Ok(());
    }

    println!("FIRE number: {}", fmt_money(&result.fire_number));
    match (result.fire_age, result.years_to_fire) {
        (Some(age), Some(years)) => println!(
            "FIRE reached at age {} in {} years with {}",
            age,
            years,
            fmt_money(&result.projected_savings_at_fire)
        ),
        _ => println!("FIRE not reached within the projection horizon"),
    }
    let rows = result
        .yearly_points
        .iter()
        .map(|p| {
            vec![
                p.age.to_string(),
                p.calendar_year.to_string(),
                fmt_money(&p.total_savings),
                fmt_money(&p.total_contributions),
                fmt_money(&p.total_growth),
                fmt_money(&p.inflation_adjusted_fire_number),
                fmt_money(&p.annual_contribution),
                if p.is_milestone { "FIRE".into() } else { String::new() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Age",
                "Year",
                "Savings",
                "Contributed",
                "Growth",
                "Target",
                "Contribution",
                "",
            ],
            rows
        )
    );
    Ok(())
}

pub fn write_points_csv(path: &str, points: &[YearlyPoint]) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Create CSV at {}", path))?;
    wtr.write_record([
        "age",
        "calendar_year",
        "total_savings",
        "total_contributions",
        "total_growth",
        "inflation_adjusted_fire_number",
        "annual_contribution",
        "is_milestone",
    ])?;
    for p in points {
        wtr.write_record([
            p.age.to_string(),
            p.calendar_year.to_string(),
            p.total_savings.to_string(),
            p.total_contributions.to_string(),
            p.total_growth.to_string(),
            p.inflation_adjusted_fire_number.to_string(),
            p.annual_contribution.to_string(),
            p.is_milestone.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
