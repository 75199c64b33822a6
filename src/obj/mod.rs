// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! In-memory OBJ document model
//!
//! Geometry values live in per-channel arenas owned by the [`Document`];
//! topology elements reference them through slot handles so that duplicate
//! rewrites and compaction never touch the elements' raw text indices.

pub mod document;
pub mod element;
pub mod geometry;
pub mod keyword;

pub use document::{Document, DocumentStats, SubMesh};
pub use element::{Declaration, Element};
pub use geometry::{Geometry, GeometryStats, GeometryValue};
pub use keyword::{Channel, ElementKind, Keyword, SubMeshKind};

use thiserror::Error;

/// Malformed OBJ content. Wrapped with the 1-based source line number at
/// the parser layer.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("unsupported keyword {keyword:?}")]
    UnsupportedKeyword { keyword: String },

    #[error("invalid number {token:?}: {source}")]
    InvalidNumber {
        token: String,
        source: std::num::ParseFloatError,
    },

    #[error("too many components in {channel} declaration")]
    ExtraComponents { channel: Channel },

    #[error("invalid index {token:?}: {source}")]
    InvalidIndex {
        token: String,
        source: std::num::ParseIntError,
    },

    #[error("too many fields in {kind} vertex group")]
    ExtraFields { kind: ElementKind },

    #[error("face has more than four vertex groups")]
    ExtraVertices,

    #[error("{channel} index {index} out of bounds ({declared} declared)")]
    IndexOutOfBounds {
        channel: Channel,
        index: i64,
        declared: usize,
    },
}
