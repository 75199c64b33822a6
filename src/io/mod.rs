// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! I/O module - parsing and serializing OBJ files

mod parser;
mod writer;

pub use parser::{parse, parse_file, parse_str, ParseError, ParseOptions, ParseOutput};
pub use writer::{write_file, write_sink, write_string, write_to};
