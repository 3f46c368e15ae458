// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Fatal core errors. Everything else is surfaced as `anyhow` context from
/// the command layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("no user configured; run 'weekflow user set <name>' first")]
    Unauthorized,

    #[error("unknown transaction type '{0}'")]
    UnknownTransactionType(String),

    #[error("recalculation anchor period {0} not found")]
    AnchorNotFound(i64),
}
