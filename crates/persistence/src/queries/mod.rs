// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `catalog`: services, components and department overrides
//! - `factors`: factor rows and counts
//! - `freeze`: per-year freeze records and row-level stamps
//! - `audit`: audit event timeline

pub mod audit;
pub mod catalog;
pub mod factors;
pub mod freeze;
