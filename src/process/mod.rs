// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Post-processing passes that rewrite the parsed document

mod duplicates;
mod merge;

pub use duplicates::Duplicates;
pub use merge::Merge;

use crate::cli::Reporter;
use crate::config::Config;
use crate::obj::Document;
use anyhow::Result;
use std::time::{Duration, Instant};

/// A document rewrite pass. Passes run in order and each one leaves the
/// document in a consistent state for the next.
pub trait Processor {
    fn name(&self) -> &'static str;
    fn desc(&self) -> &'static str;
    fn enabled(&self, config: &Config) -> bool;
    fn execute(&self, document: &mut Document, config: &Config, reporter: &Reporter)
        -> Result<()>;
}

/// Wall-clock spent in one pipeline stage, for the run summary.
#[derive(Debug, Clone)]
pub struct StageTiming {
    pub step: String,
    pub duration: Duration,
}

pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    /// The stock pass order: deduplicate geometry, then merge by material.
    pub fn standard() -> Self {
        Self {
            processors: vec![Box::new(Duplicates), Box::new(Merge)],
        }
    }

    pub fn run(
        &self,
        document: &mut Document,
        config: &Config,
        reporter: &Reporter,
    ) -> Result<Vec<StageTiming>> {
        let mut timings = Vec::new();
        for (position, processor) in self.processors.iter().enumerate() {
            reporter.blank();
            if !processor.enabled(config) {
                reporter.info(&format!(
                    "processor #{}: {} - Disabled",
                    position + 1,
                    processor.name()
                ));
                continue;
            }
            reporter.info(&format!("processor #{}: {}", position + 1, processor.name()));
            let started = Instant::now();
            processor.execute(document, config, reporter)?;
            timings.push(StageTiming {
                step: processor.name().to_string(),
                duration: started.elapsed(),
            });
        }
        Ok(timings)
    }
}
