// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! CLI subsystem for objslim

pub mod reporter;
pub mod summary;

pub use reporter::Reporter;
pub use summary::RunStats;
