// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules for the persistence layer.
//!
//! ## Module Organization
//!
//! - `catalog`: departments, services, components and overrides
//! - `factors`: factor inserts and conditional updates
//! - `freeze`: the bulk financial-year freeze
//! - `audit`: audit event persistence

pub mod audit;
pub mod catalog;
pub mod factors;
pub mod freeze;
