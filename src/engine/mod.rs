// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure computation: projection, reconciliation, redistribution, diffing and
//! cash-flow aggregation. Nothing in here touches the database.

pub mod amortization;
pub mod cashflow;
pub mod month;
pub mod projector;
pub mod reconciler;
pub mod redistribution;
pub mod synchronizer;

pub use month::{Month, MonthRange};
