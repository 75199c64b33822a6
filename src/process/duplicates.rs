// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Duplicate geometry detection, reference rewriting and compaction

use crate::cli::Reporter;
use crate::config::Config;
use crate::obj::{Channel, Document, GeometryValue};
use crate::process::Processor;
use crate::utils::{compute_float_perc, format_duration};
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// One surviving value and the slots it absorbs. Slots are 0-based handles
/// into the channel arena being scanned.
#[derive(Debug, Clone)]
struct Replacer {
    value: usize,
    absorbed: AHashSet<usize>,
}

impl Replacer {
    fn new(value: usize) -> Self {
        Self {
            value,
            absorbed: AHashSet::new(),
        }
    }

    fn hit(&mut self, slot: usize) {
        // cannot absorb self
        if slot != self.value {
            self.absorbed.insert(slot);
        }
    }

    fn hits(&self, slot: usize) -> bool {
        self.absorbed.contains(&slot)
    }

    fn remove(&mut self, slot: usize) {
        self.absorbed.remove(&slot);
    }

    fn is_empty(&self) -> bool {
        self.absorbed.is_empty()
    }

    fn len(&self) -> usize {
        self.absorbed.len()
    }

    /// Fold `other` into self. Only hits whose value matches self's value
    /// move over; a transitive chain must not collapse into one group, so
    /// when anything stays behind self also stops absorbing other's value.
    /// Returns whether other emptied out completely.
    fn merge(&mut self, other: &mut Replacer, values: &[GeometryValue], epsilon: f64) -> bool {
        let members: Vec<usize> = other.absorbed.iter().copied().collect();
        for slot in members {
            if slot == self.value {
                other.remove(slot);
                continue;
            }
            if self.hits(slot) {
                other.remove(slot);
            } else if values[self.value].equals(&values[slot], epsilon) {
                self.hit(slot);
                other.remove(slot);
            }
        }
        let complete = other.is_empty();
        if !complete {
            self.remove(other.value);
        }
        complete
    }
}

/// Scan outcome for one channel.
struct ChannelResult {
    channel: Channel,
    replacers: Vec<Replacer>,
    spent: Duration,
}

impl ChannelResult {
    fn duplicates(&self) -> usize {
        self.replacers.iter().map(Replacer::len).sum()
    }
}

/// Contiguous scan ranges, one per worker, the last one taking the
/// remainder.
fn split_ranges(len: usize, workers: usize) -> Vec<(usize, usize)> {
    if len == 0 {
        return Vec::new();
    }
    let per_range = len / workers.max(1);
    if per_range == 0 {
        return vec![(0, len)];
    }
    let mut ranges = Vec::new();
    for worker in 0..workers {
        let start = worker * per_range;
        let end = if worker == workers - 1 {
            len
        } else {
            start + per_range
        };
        ranges.push((start, end));
        if end == len {
            break;
        }
    }
    ranges
}

/// Compare every value against all later values of its channel. Ranges run
/// in parallel; hits only ever point forward, so each pair is examined once
/// and range results concatenate into a stable order.
fn scan_channel(
    values: &[GeometryValue],
    epsilon: f64,
    ranges: &[(usize, usize)],
    progress: Option<&ProgressBar>,
) -> Vec<Replacer> {
    let buckets: Vec<Vec<Replacer>> = ranges
        .par_iter()
        .map(|&(start, end)| {
            let mut found = Vec::new();
            for first in start..end {
                if let Some(bar) = progress {
                    bar.inc(1);
                }
                let mut replacer = Replacer::new(first);
                for (second, other) in values.iter().enumerate().skip(first + 1) {
                    if other.equals(&values[first], epsilon) {
                        replacer.hit(second);
                    }
                }
                if !replacer.is_empty() {
                    found.push(replacer);
                }
            }
            found
        })
        .collect();

    let mut results: Vec<Replacer> = buckets.into_iter().flatten().collect();
    results.sort_by_key(|replacer| replacer.value);
    results
}

/// First cleanup pass: fold groups whose primary values are duplicates of
/// each other.
fn merge_replacers(results: &mut [Replacer], values: &[GeometryValue], epsilon: f64) {
    for first in 0..results.len() {
        let (head, tail) = results.split_at_mut(first + 1);
        let r1 = &mut head[first];
        if r1.is_empty() {
            continue;
        }
        for r2 in tail.iter_mut() {
            if r2.is_empty() {
                continue;
            }
            assert!(
                r1.value != r2.value,
                "duplicate scan produced two groups for slot {}",
                r1.value
            );
            if r1.hits(r2.value) {
                r1.merge(r2, values, epsilon);
            }
        }
    }
}

/// Second cleanup pass: a value sitting between two groups can be absorbed
/// by both. Keep it in the group whose primary value is closest.
fn resolve_conflicts(results: &mut [Replacer], values: &[GeometryValue]) {
    for first in 0..results.len() {
        let (head, tail) = results.split_at_mut(first + 1);
        let r1 = &mut head[first];
        if r1.is_empty() {
            continue;
        }
        for r2 in tail.iter_mut() {
            if r2.is_empty() {
                continue;
            }
            keep_closest(r1, r2, values);
        }
    }
}

fn keep_closest(r1: &mut Replacer, r2: &mut Replacer, values: &[GeometryValue]) {
    let members: Vec<usize> = r2.absorbed.iter().copied().collect();
    for slot in members {
        if !r1.hits(slot) {
            continue;
        }
        let d1 = values[r1.value].distance_sq(&values[slot]);
        let d2 = values[r2.value].distance_sq(&values[slot]);
        if d1 < d2 {
            r2.remove(slot);
        } else {
            r1.remove(slot);
        }
    }
}

/// Absorbed index -> surviving slot, flattened over all groups of a channel.
fn flatten_survivors(
    replacers: &[Replacer],
    values: &[GeometryValue],
    reporter: &Reporter,
) -> AHashMap<i64, usize> {
    let mut out = AHashMap::new();
    for replacer in replacers {
        for &slot in &replacer.absorbed {
            let index = values[slot].index as i64;
            if let Some(previous) = out.insert(index, replacer.value) {
                reporter.warn(&format!(
                    "index {} absorbed by both slot {} and slot {}",
                    index, previous, replacer.value
                ));
            }
        }
    }
    out
}

/// Walk every declaration of the channel, flag the superseded value for
/// discard and repoint the slot handle at the survivor. Raw indices stay
/// untouched, the effective index follows the handle.
fn rewrite_references(
    document: &mut Document,
    result: &ChannelResult,
    reporter: &Reporter,
) -> usize {
    let started = Instant::now();

    let survivors = {
        let values = document.geometry.channel(result.channel);
        flatten_survivors(&result.replacers, values, reporter)
    };

    let mut replaced = 0;
    let Document {
        geometry, objects, ..
    } = document;
    let values = geometry.channel_mut(result.channel);
    for submesh in objects.iter_mut() {
        for element in submesh.elements.iter_mut() {
            for declaration in element.declarations.iter_mut() {
                let Some((index, slot)) = declaration.cite_mut(result.channel) else {
                    continue;
                };
                let Some(&target) = survivors.get(&*index) else {
                    continue;
                };
                if let Some(current) = *slot {
                    values[current].discard = true;
                }
                *slot = Some(target);
                replaced += 1;
            }
        }
    }

    reporter.info(&format!(
        "  - {:<2} {:>7} refs replaced in {}",
        result.channel,
        replaced,
        format_duration(started.elapsed())
    ));
    replaced
}

fn channel_progress(len: usize, channel: Channel, config: &Config) -> Option<ProgressBar> {
    if config.no_progress || config.quiet {
        return None;
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar.set_prefix(format!("  - {:<2}", channel));
    Some(bar)
}

pub struct Duplicates;

impl Processor for Duplicates {
    fn name(&self) -> &'static str {
        "Duplicates"
    }

    fn desc(&self) -> &'static str {
        "Removes duplicate v/vn/vt declarations. Rewrites vertex data references."
    }

    fn enabled(&self, config: &Config) -> bool {
        config.dedup
    }

    fn execute(
        &self,
        document: &mut Document,
        config: &Config,
        reporter: &Reporter,
    ) -> Result<()> {
        let pre_stats = document.geometry.stats();
        let epsilon = config.epsilon;
        reporter.info(&format!("  - Using epsilon of {:e}", epsilon));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .context("Failed to build worker pool")?;

        let mut results = Vec::new();
        for &channel in Channel::ALL.iter() {
            let values = document.geometry.channel(channel);
            if values.is_empty() {
                continue;
            }
            let started = Instant::now();
            let progress = channel_progress(values.len(), channel, config);
            let ranges = split_ranges(values.len(), config.workers);
            let mut replacers =
                pool.install(|| scan_channel(values, epsilon, &ranges, progress.as_ref()));
            if let Some(bar) = &progress {
                bar.finish_and_clear();
            }
            merge_replacers(&mut replacers, values, epsilon);
            resolve_conflicts(&mut replacers, values);
            replacers.retain(|replacer| !replacer.is_empty());
            results.push(ChannelResult {
                channel,
                replacers,
                spent: started.elapsed(),
            });
        }

        for result in &results {
            reporter.info(&format!(
                "  - {:<2} {:>7} duplicates found for {} unique indexes ({}%) in {}",
                result.channel,
                result.duplicates(),
                result.replacers.len(),
                compute_float_perc(
                    result.duplicates() as f64,
                    pre_stats.channel(result.channel) as f64
                ),
                format_duration(result.spent)
            ));
            rewrite_references(document, result, reporter);
        }

        document.compact_geometry();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{parse_str, write_string, ParseOptions};

    fn values_from(coords: &[(f64, f64, f64)]) -> Vec<GeometryValue> {
        coords
            .iter()
            .enumerate()
            .map(|(slot, &(x, y, z))| GeometryValue {
                index: slot + 1,
                x,
                y,
                z,
                w: 1.0,
                ..Default::default()
            })
            .collect()
    }

    fn test_config() -> Config {
        Config {
            workers: 2,
            no_progress: true,
            quiet: true,
            ..Config::default()
        }
    }

    #[test]
    fn test_split_ranges() {
        assert_eq!(split_ranges(10, 3), vec![(0, 3), (3, 6), (6, 10)]);
        assert_eq!(split_ranges(9, 3), vec![(0, 3), (3, 6), (6, 9)]);
        assert_eq!(split_ranges(2, 16), vec![(0, 2)]);
        assert_eq!(split_ranges(0, 4), Vec::<(usize, usize)>::new());
    }

    #[test]
    fn test_scan_hits_point_forward_only() {
        let values = values_from(&[(0.0, 0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0)]);
        let ranges = split_ranges(values.len(), 1);
        let results = scan_channel(&values, 1e-6, &ranges, None);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].value, 0);
        assert!(results[0].hits(1) && results[0].hits(2));
        assert_eq!(results[1].value, 1);
        assert!(results[1].hits(2) && !results[1].hits(0));
    }

    #[test]
    fn test_merge_collapses_identical_run() {
        let values = values_from(&[(0.0, 0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0)]);
        let ranges = split_ranges(values.len(), 1);
        let mut results = scan_channel(&values, 1e-6, &ranges, None);
        merge_replacers(&mut results, &values, 1e-6);
        resolve_conflicts(&mut results, &values);
        results.retain(|replacer| !replacer.is_empty());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, 0);
        assert_eq!(results[0].len(), 2);
    }

    #[test]
    fn test_merge_rejects_partial_fold() {
        // A chain: each neighbor within epsilon, the ends apart. Folding the
        // whole chain into the first value would drag the far end past the
        // tolerance.
        let values = values_from(&[(0.0, 0.0, 0.0), (9e-7, 0.0, 0.0), (1.8e-6, 0.0, 0.0)]);
        let ranges = split_ranges(values.len(), 1);
        let mut results = scan_channel(&values, 1e-6, &ranges, None);
        merge_replacers(&mut results, &values, 1e-6);
        resolve_conflicts(&mut results, &values);
        results.retain(|replacer| !replacer.is_empty());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, 1);
        assert!(results[0].hits(2));
    }

    #[test]
    fn test_conflict_keeps_closest_group() {
        // The middle value is within epsilon of both ends while the ends are
        // not duplicates of each other. The nearer end wins.
        let values = values_from(&[(0.0, 0.0, 0.0), (1.6e-6, 0.0, 0.0), (7e-7, 0.0, 0.0)]);
        let ranges = split_ranges(values.len(), 1);
        let mut results = scan_channel(&values, 1e-6, &ranges, None);
        merge_replacers(&mut results, &values, 1e-6);
        resolve_conflicts(&mut results, &values);
        results.retain(|replacer| !replacer.is_empty());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, 0);
        assert!(results[0].hits(2));
    }

    #[test]
    fn test_execute_rewrites_and_compacts() {
        let mut document = parse_str(
            "o a\n\
             v 0 0 0\n\
             v 0.0000005 0 0\n\
             v 1 1 1\n\
             f 1 2 3\n",
            &ParseOptions::default(),
        )
        .unwrap()
        .document;

        Duplicates
            .execute(&mut document, &test_config(), &Reporter::silent())
            .unwrap();

        assert_eq!(document.geometry.positions.len(), 2);
        let text = write_string(&document);
        assert!(text.contains("# vertices [2]"));
        assert!(text.contains("f 1 1 2"));
    }

    #[test]
    fn test_execute_leaves_unreferenced_duplicates() {
        // The second vertex is a duplicate but nothing cites it, so it is
        // never flagged and survives compaction.
        let mut document = parse_str(
            "o a\nv 0 0 0\nv 0 0 0\nf 1 1 1\n",
            &ParseOptions::default(),
        )
        .unwrap()
        .document;

        Duplicates
            .execute(&mut document, &test_config(), &Reporter::silent())
            .unwrap();

        assert_eq!(document.geometry.positions.len(), 2);
        assert!(write_string(&document).contains("f 1 1 1"));
    }

    #[test]
    fn test_execute_covers_all_channels_and_kinds() {
        let mut document = parse_str(
            "o a\n\
             v 0 0 0\n\
             v 0 0 0\n\
             v 1 0 0\n\
             vn 0 1 0\n\
             vn 0 1 0\n\
             vt 0.5 0.5\n\
             vt 0.5 0.5\n\
             f 1/1/1 2/2/2 3/1/2\n\
             l 1 2 3\n\
             p 2\n",
            &ParseOptions::default(),
        )
        .unwrap()
        .document;

        Duplicates
            .execute(&mut document, &test_config(), &Reporter::silent())
            .unwrap();

        assert_eq!(document.geometry.positions.len(), 2);
        assert_eq!(document.geometry.normals.len(), 1);
        assert_eq!(document.geometry.uvs.len(), 1);

        let text = write_string(&document);
        assert!(text.contains("f 1/1/1 1/1/1 2/1/1"));
        assert!(text.contains("l 1 2"));
        assert!(text.contains("p 1"));
    }

    #[test]
    fn test_execute_is_deterministic() {
        let source = "o a\n\
                      v 0 0 0\nv 0 0 0\nv 0.0000005 0 0\nv 1 0 0\nv 1 0 0\n\
                      vn 0 0 1\nvn 0 0 1\n\
                      f 1/0/1 2/0/2 4/0/1\nf 3 4 5\nf 5 1 2\n";
        let config = Config {
            workers: 8,
            ..test_config()
        };

        let mut first = parse_str(source, &ParseOptions::default()).unwrap().document;
        Duplicates
            .execute(&mut first, &config, &Reporter::silent())
            .unwrap();

        let mut second = parse_str(source, &ParseOptions::default()).unwrap().document;
        Duplicates
            .execute(&mut second, &config, &Reporter::silent())
            .unwrap();

        assert_eq!(write_string(&first), write_string(&second));
    }
}
