// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Materializes due recurring obligations into realized transactions.
//!
//! A run fires each due obligation at most once and then advances its due
//! date by one period. An obligation several periods behind needs several
//! runs to catch up. Runs are not safe to overlap: callers must serialize
//! them.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use super::recurrence::next_date;
use crate::models::{RecurringObligation, Transaction};

pub const AUTO_PREFIX: &str = "[AUTO] ";

/// Where due obligations come from.
pub trait ObligationSource {
    /// Active obligations whose next due date is on or before `as_of`, plus
    /// due rows that could not be read.
    fn due_obligations(&self, as_of: NaiveDate) -> Result<DueBatch>;
}

/// Where materialized transactions and advanced obligations go.
///
/// The two writes for one obligation are bracketed by `begin_obligation` and
/// either `commit_obligation` or `rollback_obligation`. Stores that can undo
/// a partial write implement the three hooks; the defaults do nothing.
pub trait TransactionSink {
    /// Persists a new transaction and returns its id.
    fn save_transaction(&mut self, tx: &Transaction) -> Result<i64>;
    fn save_obligation(&mut self, obligation: &RecurringObligation) -> Result<()>;

    fn begin_obligation(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit_obligation(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback_obligation(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObligationWriteFailure {
    pub obligation_id: i64,
    pub reason: String,
}

/// What a source hands the processor for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DueBatch {
    pub obligations: Vec<RecurringObligation>,
    /// Due rows the source could not turn into obligations.
    pub unreadable: Vec<ObligationWriteFailure>,
}

impl From<Vec<RecurringObligation>> for DueBatch {
    fn from(obligations: Vec<RecurringObligation>) -> Self {
        Self {
            obligations,
            unreadable: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingSummary {
    pub processed: usize,
    pub failed: usize,
    pub failures: Vec<ObligationWriteFailure>,
}

impl ProcessingSummary {
    fn record_failure(&mut self, failure: ObligationWriteFailure) {
        log::warn!(
            "Obligation {} failed: {}",
            failure.obligation_id,
            failure.reason
        );
        self.failed += 1;
        self.failures.push(failure);
    }
}

/// The realized transaction for one firing of `obligation`, dated at its
/// current due date.
pub fn materialize(obligation: &RecurringObligation) -> Transaction {
    Transaction {
        id: None,
        owner_id: obligation.owner_id,
        date: obligation.next_due_date,
        amount: obligation.amount,
        description: format!("{}{}", AUTO_PREFIX, obligation.description),
        category: obligation.category.clone(),
        kind: obligation.kind,
    }
}

pub fn process_due<S, K>(as_of: NaiveDate, source: &S, sink: &mut K) -> Result<ProcessingSummary>
where
    S: ObligationSource + ?Sized,
    K: TransactionSink + ?Sized,
{
    let batch = source.due_obligations(as_of)?;
    let due: Vec<RecurringObligation> = batch
        .obligations
        .into_iter()
        .filter(|o| o.active && o.next_due_date <= as_of)
        .collect();

    log::info!(
        "Processing {} recurring obligations due on or before {} ({} unreadable)",
        due.len(),
        as_of,
        batch.unreadable.len()
    );

    let mut summary = ProcessingSummary::default();
    for failure in batch.unreadable {
        summary.record_failure(failure);
    }
    for obligation in &due {
        match fire_atomically(obligation, sink) {
            Ok(tx_id) => {
                summary.processed += 1;
                log::debug!(
                    "Obligation {} materialized as transaction {} on {}",
                    obligation.id,
                    tx_id,
                    obligation.next_due_date
                );
            }
            Err(err) => summary.record_failure(ObligationWriteFailure {
                obligation_id: obligation.id,
                reason: format!("{:#}", err),
            }),
        }
    }
    Ok(summary)
}

/// Both writes for `obligation` land, or neither does.
fn fire_atomically<K>(obligation: &RecurringObligation, sink: &mut K) -> Result<i64>
where
    K: TransactionSink + ?Sized,
{
    sink.begin_obligation()?;
    let fired = fire_once(obligation, sink).and_then(|tx_id| {
        sink.commit_obligation()?;
        Ok(tx_id)
    });
    if fired.is_err() {
        sink.rollback_obligation().unwrap_or_else(|undo| {
            log::error!(
                "Could not undo partial writes for obligation {}: {:#}",
                obligation.id,
                undo
            )
        });
    }
    fired
}

fn fire_once<K>(obligation: &RecurringObligation, sink: &mut K) -> Result<i64>
where
    K: TransactionSink + ?Sized,
{
    // Computed first so a date overflow writes nothing.
    let advanced_to = next_date(obligation.next_due_date, obligation.frequency)?;

    let tx_id = sink.save_transaction(&materialize(obligation))?;

    let mut advanced = obligation.clone();
    advanced.next_due_date = advanced_to;
    sink.save_obligation(&advanced)?;
    Ok(tx_id)
}
