// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Human-readable formatting for the run summary

use std::path::Path;
use std::time::Duration;

/// Group digits in threes with spaces: 1234567 -> "1 234 567".
pub fn format_int(num: i64) -> String {
    let digits = num.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (position, ch) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    if num < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_bytes(num_bytes: i64) -> String {
    const KB: f64 = 1024.0;
    let prefix = if num_bytes < 0 { "-" } else { "" };
    let abs = num_bytes.unsigned_abs() as f64;
    if abs >= KB * KB * KB {
        format!("{}{:.2} GB", prefix, abs / KB / KB / KB)
    } else if abs >= KB * KB {
        format!("{}{:.2} MB", prefix, abs / KB / KB)
    } else if abs >= KB {
        format!("{}{:.2} kB", prefix, abs / KB)
    } else {
        format!("{}{} B", prefix, num_bytes.unsigned_abs())
    }
}

/// Format a duration with the largest unit ladder that applies,
/// seconds always carrying two decimals.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs_f64();
    let total_minutes = total_seconds / 60.0;
    if total_minutes < 1.0 {
        return format!("{:.2}s", total_seconds);
    }
    let seconds = total_seconds % 60.0;
    if total_minutes < 60.0 {
        return format!("{}m {:.2}s", total_minutes.floor() as u64, seconds);
    }
    let total_hours = total_minutes / 60.0;
    let minutes = total_minutes % 60.0;
    if total_hours < 24.0 {
        return format!(
            "{}h {}m {:.2}s",
            total_hours.floor() as u64,
            minutes.floor() as u64,
            seconds
        );
    }
    let total_days = total_hours / 24.0;
    let hours = total_hours % 24.0;
    if total_days < 7.0 {
        return format!(
            "{}d {}h {}m {:.2}s",
            total_days.floor() as u64,
            hours.floor() as u64,
            minutes.floor() as u64,
            seconds
        );
    }
    let days = total_days % 7.0;
    format!(
        "{}w {}d {}h {}m {:.2}s",
        (total_days / 7.0).floor() as u64,
        days.floor() as u64,
        hours.floor() as u64,
        minutes.floor() as u64,
        seconds
    )
}

pub fn compute_perc(step: f64, total: f64) -> f64 {
    if step == 0.0 {
        0.0
    } else if total == 0.0 {
        100.0
    } else {
        (step / total) * 100.0
    }
}

/// Percentage as a string, two decimals below 1% and whole numbers above.
pub fn compute_float_perc(step: f64, total: f64) -> String {
    let perc = compute_perc(step, total);
    if perc < 1.0 {
        format!("{:.2}", perc)
    } else {
        format!("{}", perc as i64)
    }
}

pub fn compute_duration_perc(step: Duration, total: Duration) -> String {
    compute_float_perc(step.as_secs_f64(), total.as_secs_f64())
}

/// Delta column for before/after counts: empty when unchanged, "+n" for
/// growth, "n    -p%" for reductions with the percentage rounded to whole
/// numbers once the cut is past one percent.
pub fn compute_stats_diff(before: i64, after: i64) -> String {
    if before == after {
        return String::new();
    }
    let diff = after - before;
    let perc = compute_perc(after as f64, before as f64);
    if perc >= 99.999999 {
        format!("+{:<7}", diff)
    } else if perc <= 99.0 {
        format!("{:<7}    -{}%", diff, 100 - perc as i64)
    } else {
        format!("{:<7}    -{:.2}%", diff, 100.0 - perc)
    }
}

/// File name without directories or the final extension.
pub fn file_basename(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
