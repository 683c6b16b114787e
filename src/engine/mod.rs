// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod money;
pub mod processor;
pub mod projection;
pub mod recurrence;

pub use processor::{
    process_due, DueBatch, ObligationSource, ObligationWriteFailure, ProcessingSummary,
    TransactionSink,
};
pub use projection::{project, project_from};
pub use recurrence::next_date;
