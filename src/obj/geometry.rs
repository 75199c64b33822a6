// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Geometry channels and their numeric value records

use super::{Channel, ObjError};
use serde::Serialize;

/// One declared geometry value: up to four components plus its 1-based
/// position among the survivors of its channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryValue {
    pub index: usize,
    /// Superseded by a duplicate; dropped at the next compaction.
    pub discard: bool,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl GeometryValue {
    /// Componentwise tolerance match. Each of the four components must be
    /// within epsilon on its own, the deltas are never combined.
    pub fn equals(&self, other: &GeometryValue, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
            && (self.w - other.w).abs() <= epsilon
    }

    /// Squared euclidean distance over x/y/z, used only to break ties
    /// between competing duplicate groups.
    pub fn distance_sq(&self, other: &GeometryValue) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Component text for serialization. UVs carry two components, positions
    /// omit a w within 1e-10 of the default 1.0.
    pub fn format(&self, channel: Channel) -> String {
        match channel {
            Channel::Uv => format!("{} {}", self.x, self.y),
            Channel::Position => {
                if (self.w - 1.0).abs() > 1e-10 {
                    format!("{} {} {} {}", self.x, self.y, self.z, self.w)
                } else {
                    format!("{} {} {}", self.x, self.y, self.z)
                }
            }
            Channel::Normal | Channel::Param => format!("{} {} {}", self.x, self.y, self.z),
        }
    }
}

/// The four channel arenas. Values are only ever appended during parsing;
/// later stages flag discards and compact.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<GeometryValue>,
    pub normals: Vec<GeometryValue>,
    pub uvs: Vec<GeometryValue>,
    pub params: Vec<GeometryValue>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: Channel) -> &[GeometryValue] {
        match channel {
            Channel::Position => &self.positions,
            Channel::Normal => &self.normals,
            Channel::Uv => &self.uvs,
            Channel::Param => &self.params,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut Vec<GeometryValue> {
        match channel {
            Channel::Position => &mut self.positions,
            Channel::Normal => &mut self.normals,
            Channel::Uv => &mut self.uvs,
            Channel::Param => &mut self.params,
        }
    }

    /// Parse a declaration payload into the channel and return the appended
    /// value. Components are read left to right into x, y, z and, for
    /// positions, w (default 1). Strict mode rejects overflow components,
    /// otherwise they are dropped.
    pub fn read_value(
        &mut self,
        channel: Channel,
        payload: &str,
        strict: bool,
    ) -> Result<&GeometryValue, ObjError> {
        let mut value = GeometryValue::default();
        if channel == Channel::Position {
            value.w = 1.0;
        }
        for (position, raw) in payload.split_whitespace().enumerate() {
            if position > 3 || (position == 3 && channel != Channel::Position) {
                if strict {
                    return Err(ObjError::ExtraComponents { channel });
                }
                break;
            }
            let token = normalize_negative_zero(raw);
            let number: f64 = token.parse().map_err(|source| ObjError::InvalidNumber {
                token: raw.to_string(),
                source,
            })?;
            match position {
                0 => value.x = number,
                1 => value.y = number,
                2 => value.z = number,
                _ => value.w = number,
            }
        }
        let values = self.channel_mut(channel);
        value.index = values.len() + 1;
        values.push(value);
        Ok(&values[value.index - 1])
    }

    pub fn stats(&self) -> GeometryStats {
        GeometryStats {
            positions: self.positions.len(),
            normals: self.normals.len(),
            uvs: self.uvs.len(),
            params: self.params.len(),
        }
    }
}

/// Exported "-0" and "-0.000..." spellings collapse to plain zero so the
/// duplicate scan and the output treat them as one value.
fn normalize_negative_zero(token: &str) -> &str {
    if token == "-0" {
        return "0";
    }
    if let Some(rest) = token.strip_prefix("-0.") {
        if rest.bytes().all(|b| b == b'0') {
            return "0";
        }
    }
    token
}

/// Per-channel value counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeometryStats {
    pub positions: usize,
    pub normals: usize,
    pub uvs: usize,
    pub params: usize,
}

impl GeometryStats {
    pub fn channel(&self, channel: Channel) -> usize {
        match channel {
            Channel::Position => self.positions,
            Channel::Normal => self.normals,
            Channel::Uv => self.uvs,
            Channel::Param => self.params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions == 0 && self.normals == 0 && self.uvs == 0 && self.params == 0
    }
}
