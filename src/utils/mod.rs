// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Shared formatting helpers

mod format;

pub use format::{
    compute_duration_perc, compute_float_perc, compute_perc, compute_stats_diff, file_basename,
    format_bytes, format_duration, format_int,
};
