// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! objslim
//!
//! Rewrites Wavefront OBJ files into an equivalent smaller form: duplicate
//! geometry values collapse into one declaration, multi-material meshes are
//! split and re-merged so every object carries a single material.

pub mod cli;
pub mod config;
pub mod io;
pub mod obj;
pub mod process;
pub mod utils;

pub use config::Config;
pub use io::{parse_file, parse_str, write_file, write_string, ParseOptions, ParseOutput};
pub use obj::{Document, DocumentStats};
pub use process::Pipeline;

use anyhow::Result;
use cli::Reporter;

pub const APP_NAME: &str = "objslim";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_URL: &str = "https://github.com/objslim/objslim";

/// Run the full pipeline over an in-memory document and serialize the
/// result, without any logging. The entry point for library callers.
pub fn simplify(source: &str, config: &Config) -> Result<String> {
    config.validate()?;
    let options = ParseOptions {
        strict: config.strict,
        ..Default::default()
    };
    let output = parse_str(source, &options)?;
    let mut document = output.document;
    Pipeline::standard().run(&mut document, config, &Reporter::silent())?;
    Ok(write_string(&document))
}
