// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error taxonomy for the projection engine and its store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or malformed input; nothing was read or written.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A statement inside a timeline batch failed. The batch runs in one
    /// transaction, so every earlier statement was rolled back with it.
    #[error("Timeline write failed during {operation} (entries: {entries:?}); batch rolled back: {source}")]
    PartialWrite {
        operation: &'static str,
        entries: Vec<String>,
        #[source]
        source: rusqlite::Error,
    },

    #[error(
        "Obligation {obligation_id} timeline changed concurrently (expected revision {expected}, found {found})"
    )]
    Conflict {
        obligation_id: i64,
        expected: i64,
        found: i64,
    },

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
