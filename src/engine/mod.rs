// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The period accounting engine: pure functions over in-memory snapshots of
//! periods and transactions. All storage I/O lives in the command layer.

pub mod calendar;
pub mod delta;
pub mod derive;
pub mod recalc;
