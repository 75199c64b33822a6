// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Run configuration shared by the library pipeline and the CLI

use serde::Serialize;
use thiserror::Error;

/// Parameters of one optimization run.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Componentwise tolerance for duplicate detection.
    pub epsilon: f64,
    /// Reject malformed payload tails instead of truncating them.
    pub strict: bool,
    /// Worker threads for the duplicate scan.
    pub workers: usize,
    /// Run the duplicate-removal stage.
    pub dedup: bool,
    /// Run the material merge stage.
    pub merge: bool,
    /// Gzip compression level for the output, 1 (fastest) to 9 (best).
    pub gzip: Option<u32>,
    /// Suppress all reporting.
    pub quiet: bool,
    /// Disable progress bars.
    pub no_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            strict: false,
            workers: default_workers(),
            dedup: true,
            merge: true,
            gzip: None,
            quiet: false,
            no_progress: false,
        }
    }
}

/// Default scan fan-out. The scan is embarrassingly parallel over uneven
/// ranges, so oversubscribing the cores keeps the tail ranges busy.
pub fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores * 4).max(4)
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("epsilon must be a finite non-negative number, got {0}")]
    InvalidEpsilon(f64),

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("gzip level must be between 1 and 9, got {0}")]
    InvalidGzipLevel(u32),
}

impl Config {
    /// Check the parameters before any processing starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if let Some(level) = self.gzip {
            if !(1..=9).contains(&level) {
                return Err(ConfigError::InvalidGzipLevel(level));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.workers >= 4);
        assert!(config.dedup && config.merge);
    }

    #[test]
    fn test_validate_epsilon() {
        let mut config = Config::default();
        config.epsilon = -1e-6;
        assert_eq!(config.validate(), Err(ConfigError::InvalidEpsilon(-1e-6)));
        config.epsilon = f64::NAN;
        assert!(config.validate().is_err());
        config.epsilon = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_workers() {
        let mut config = Config::default();
        config.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn test_validate_gzip_level() {
        let mut config = Config::default();
        config.gzip = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidGzipLevel(0)));
        config.gzip = Some(10);
        assert!(config.validate().is_err());
        config.gzip = Some(9);
        assert!(config.validate().is_ok());
    }
}
