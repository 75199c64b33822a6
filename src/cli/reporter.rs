// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! CLI log output with colored severity tags

use colored::*;

/// Routes log lines to stdout or stderr and honors quiet mode. When the
/// document itself goes to stdout, logging moves to stderr so the two
/// streams stay separable.
#[derive(Debug, Clone)]
pub struct Reporter {
    quiet: bool,
    use_stderr: bool,
}

impl Reporter {
    pub fn new(quiet: bool, use_stderr: bool) -> Self {
        Self { quiet, use_stderr }
    }

    /// Reporter that swallows everything, for library callers.
    pub fn silent() -> Self {
        Self::new(true, false)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn write(&self, text: &str) {
        if self.quiet {
            return;
        }
        if self.use_stderr {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }

    pub fn info(&self, text: &str) {
        self.write(text);
    }

    /// Spacer line between log sections.
    pub fn blank(&self) {
        self.write(" ");
    }

    pub fn warn(&self, text: &str) {
        self.write(&format!("{} {}", "[WARN]".yellow(), text));
    }

    pub fn error(&self, text: &str) {
        self.write(&format!("{} {}", "[ERROR]".red(), text));
    }

    /// Aligned label/value row of the summary table.
    pub fn results(&self, label: &str, value: &str) {
        self.info(&format!("{:<15} {:>15}", label, value));
    }

    /// Summary row with a trailing delta column.
    pub fn results_with(&self, label: &str, value: &str, postfix: &str) {
        self.info(&format!("{:<15} {:>15}    {}", label, value, postfix));
    }
}
