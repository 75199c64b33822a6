// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! End-of-run summary table

use crate::cli::Reporter;
use crate::obj::DocumentStats;
use crate::process::StageTiming;
use crate::utils::{
    compute_duration_perc, compute_perc, compute_stats_diff, format_bytes, format_duration,
    format_int,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the summary table needs, gathered by the CLI run.
#[derive(Debug)]
pub struct RunStats {
    pub timings: Vec<StageTiming>,
    pub total: Duration,
    /// Stats before processing, with the object and group counts as they
    /// appeared in the input rather than after synthetic splits.
    pub pre: DocumentStats,
    pub post: DocumentStats,
    pub lines_parsed: usize,
    pub lines_written: usize,
    pub input: PathBuf,
    /// Absent when the document went to stdout.
    pub output: Option<PathBuf>,
}

pub fn report(reporter: &Reporter, stats: &RunStats) {
    reporter.blank();
    for timing in &stats.timings {
        reporter.results_with(
            &timing.step,
            &format_duration(timing.duration),
            &format!(
                "{}%",
                compute_duration_perc(timing.duration, stats.total)
            ),
        );
    }
    reporter.results("Total", &format_duration(stats.total));

    geometry_rows(reporter, stats);
    vertex_data_rows(reporter, stats);
    object_rows(reporter, stats);
    file_rows(reporter, stats);
}

/// Count row with a delta column, skipped when nothing is left to count.
fn int_row(reporter: &Reporter, label: &str, value: i64, postfix: &str) {
    if value > 0 {
        reporter.results_with(label, &format_int(value), postfix);
    }
}

fn geometry_rows(reporter: &Reporter, stats: &RunStats) {
    let pre = stats.pre.geometry;
    let post = stats.post.geometry;
    if !pre.is_empty() {
        reporter.blank();
    }
    let rows = [
        ("Vertices", pre.positions, post.positions),
        ("Normals", pre.normals, post.normals),
        ("UVs", pre.uvs, post.uvs),
        ("Params", pre.params, post.params),
    ];
    for (label, before, after) in rows {
        if before > 0 {
            int_row(
                reporter,
                label,
                after as i64,
                &compute_stats_diff(before as i64, after as i64),
            );
        }
    }
}

fn vertex_data_rows(reporter: &Reporter, stats: &RunStats) {
    if stats.pre.faces > 0 || stats.pre.lines > 0 || stats.pre.points > 0 {
        reporter.blank();
    }
    let rows = [
        ("Faces", stats.pre.faces, stats.post.faces),
        ("Lines", stats.pre.lines, stats.post.lines),
        ("Points", stats.pre.points, stats.post.points),
    ];
    for (label, before, after) in rows {
        if before > 0 {
            int_row(
                reporter,
                label,
                after as i64,
                &compute_stats_diff(before as i64, after as i64),
            );
        }
    }
}

fn object_rows(reporter: &Reporter, stats: &RunStats) {
    reporter.blank();
    // an input without o/g lines can still end up with created objects
    if stats.pre.groups > 0 || stats.post.groups > 0 {
        int_row(
            reporter,
            "Groups",
            stats.post.groups as i64,
            &compute_stats_diff(stats.pre.groups as i64, stats.post.groups as i64),
        );
    }
    if stats.pre.objects > 0 || stats.post.objects > 0 {
        int_row(
            reporter,
            "Objects",
            stats.post.objects as i64,
            &compute_stats_diff(stats.pre.objects as i64, stats.post.objects as i64),
        );
    }
}

fn file_rows(reporter: &Reporter, stats: &RunStats) {
    reporter.blank();
    let parsed = stats.lines_parsed as i64;
    let written = stats.lines_written as i64;
    reporter.results("Lines input", &format_int(parsed));
    if written < parsed {
        let cut = 100.0 - compute_perc(written as f64, parsed as f64);
        reporter.results_with(
            "Lines output",
            &format_int(written),
            &format!("{:<10} -{}%", format_int(written - parsed), cut as i64),
        );
    } else {
        let growth = compute_perc(written as f64, parsed as f64) - 100.0;
        reporter.results_with(
            "Lines output",
            &format_int(written),
            &format!("+{:<10} +{}%", format_int(written - parsed), growth as i64),
        );
    }

    reporter.blank();
    let size_in = file_size(&stats.input);
    reporter.results("File input", &format_bytes(size_in));
    if let Some(output) = &stats.output {
        let size_out = file_size(output);
        if size_out < size_in {
            let cut = 100.0 - compute_perc(size_out as f64, size_in as f64);
            reporter.results_with(
                "File output",
                &format_bytes(size_out),
                &format!("{:<10} -{}%", format_bytes(size_out - size_in), cut as i64),
            );
        } else {
            let growth = compute_perc(size_out as f64, size_in as f64) - 100.0;
            reporter.results_with(
                "File output",
                &format_bytes(size_out),
                &format!("+{:<10} +{}%", format_bytes(size_out - size_in), growth as i64),
            );
        }
    }
}

fn file_size(path: &Path) -> i64 {
    fs::metadata(path).map(|meta| meta.len() as i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"v 0 0 0\n").unwrap();
        assert_eq!(file_size(file.path()), 8);
        assert_eq!(file_size(Path::new("/nonexistent/input.obj")), 0);
    }

    #[test]
    fn test_report_handles_empty_run() {
        let stats = RunStats {
            timings: Vec::new(),
            total: Duration::from_millis(1),
            pre: DocumentStats::default(),
            post: DocumentStats::default(),
            lines_parsed: 0,
            lines_written: 0,
            input: PathBuf::from("missing.obj"),
            output: None,
        };
        report(&Reporter::silent(), &stats);
    }
}
