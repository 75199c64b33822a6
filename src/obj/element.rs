// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Topology elements: faces, lines and points with their declarations

use super::{Channel, ElementKind, Geometry, ObjError};

/// One vertex slot of an element. Holds the raw parsed indices (0 = not
/// declared, negative = relative until resolution) and, once resolved, a
/// slot handle into the matching channel arena. The handle takes precedence
/// when present, which is what makes duplicate rewrites invisible to the
/// serializer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declaration {
    pub position: i64,
    pub uv: i64,
    pub normal: i64,
    pub position_slot: Option<usize>,
    pub uv_slot: Option<usize>,
    pub normal_slot: Option<usize>,
}

impl Declaration {
    pub fn new(position: i64, uv: i64, normal: i64) -> Self {
        Self {
            position,
            uv,
            normal,
            ..Default::default()
        }
    }

    /// Raw index and resolved slot for a cited channel. Params are never
    /// cited by elements.
    pub fn cite(&self, channel: Channel) -> Option<(i64, Option<usize>)> {
        match channel {
            Channel::Position => Some((self.position, self.position_slot)),
            Channel::Uv => Some((self.uv, self.uv_slot)),
            Channel::Normal => Some((self.normal, self.normal_slot)),
            Channel::Param => None,
        }
    }

    pub fn cite_mut(&mut self, channel: Channel) -> Option<(&mut i64, &mut Option<usize>)> {
        match channel {
            Channel::Position => Some((&mut self.position, &mut self.position_slot)),
            Channel::Uv => Some((&mut self.uv, &mut self.uv_slot)),
            Channel::Normal => Some((&mut self.normal, &mut self.normal_slot)),
            Channel::Param => None,
        }
    }

    /// Effective 1-based index for serialization: the referenced value's
    /// current index when a slot is resolved, the raw field otherwise.
    pub fn index(&self, channel: Channel, geometry: &Geometry) -> i64 {
        match self.cite(channel) {
            Some((_, Some(slot))) => geometry.channel(channel)[slot].index as i64,
            Some((raw, None)) => raw,
            None => 0,
        }
    }

    /// Resolve raw indices against the values declared so far: negative
    /// indices convert with `index + declared + 1` (-1 is the most recent
    /// declaration), then bounds are checked and the slot handle stored.
    pub(crate) fn resolve(&mut self, geometry: &Geometry) -> Result<(), ObjError> {
        for channel in Channel::CITED {
            let declared = geometry.channel(channel).len();
            let Some((raw, slot)) = self.cite_mut(channel) else {
                continue;
            };
            if *raw == 0 {
                continue;
            }
            let mut absolute = *raw;
            if absolute < 0 {
                absolute += declared as i64 + 1;
            }
            if absolute <= 0 || absolute > declared as i64 {
                return Err(ObjError::IndexOutOfBounds {
                    channel,
                    index: *raw,
                    declared,
                });
            }
            *raw = absolute;
            *slot = Some(absolute as usize - 1);
            let value = &geometry.channel(channel)[absolute as usize - 1];
            assert_eq!(
                value.index as i64, absolute,
                "{} value at slot {} carries index {}",
                channel,
                absolute - 1,
                value.index
            );
        }
        Ok(())
    }
}

/// One `f`, `l` or `p` statement.
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub declarations: Vec<Declaration>,
    /// Pending `s` statement attached by the parser, re-emitted on write.
    pub smoothing_group: Option<String>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            declarations: Vec::new(),
            smoothing_group: None,
        }
    }

    /// Parse an element payload. Vertex groups are whitespace separated,
    /// sub-fields slash separated with empty slots allowed. Faces stop at
    /// four groups, points take a bare vertex index only.
    pub fn parse(kind: ElementKind, payload: &str, strict: bool) -> Result<Element, ObjError> {
        let mut element = Element::new(kind);
        for group in payload.split_whitespace() {
            if kind == ElementKind::Face && element.declarations.len() == 4 {
                if strict {
                    return Err(ObjError::ExtraVertices);
                }
                break;
            }
            element.declarations.push(parse_group(group, kind, strict)?);
        }
        Ok(element)
    }

    pub(crate) fn resolve(&mut self, geometry: &Geometry) -> Result<(), ObjError> {
        for declaration in &mut self.declarations {
            declaration.resolve(geometry)?;
        }
        Ok(())
    }

    /// Serialize the payload through effective indices.
    pub fn format(&self, geometry: &Geometry) -> String {
        match self.kind {
            ElementKind::Face => self.format_face(geometry),
            ElementKind::Line => self.format_line(geometry),
            ElementKind::Point => self.format_points(geometry),
        }
    }

    fn format_face(&self, geometry: &Geometry) -> String {
        let has_uvs = self
            .declarations
            .iter()
            .any(|declaration| declaration.index(Channel::Uv, geometry) != 0);
        let has_normals = self
            .declarations
            .iter()
            .any(|declaration| declaration.index(Channel::Normal, geometry) != 0);

        let mut out = String::from("f");
        for declaration in &self.declarations {
            out.push(' ');
            push_index(&mut out, declaration.index(Channel::Position, geometry));
            // When any sibling declares a channel the slash is written for
            // all of them, even the ones leaving the slot empty.
            if has_uvs || has_normals {
                out.push('/');
                push_index(&mut out, declaration.index(Channel::Uv, geometry));
            }
            if has_normals {
                out.push('/');
                push_index(&mut out, declaration.index(Channel::Normal, geometry));
            }
        }
        out
    }

    fn format_line(&self, geometry: &Geometry) -> String {
        let has_uvs = self
            .declarations
            .iter()
            .any(|declaration| declaration.index(Channel::Uv, geometry) != 0);

        let mut out = String::from("l");
        // Deduplication can leave runs of identical points, collapse them.
        let mut previous: Option<(i64, i64)> = None;
        for declaration in &self.declarations {
            let pair = (
                declaration.index(Channel::Position, geometry),
                declaration.index(Channel::Uv, geometry),
            );
            if previous == Some(pair) {
                continue;
            }
            previous = Some(pair);
            out.push(' ');
            push_index(&mut out, pair.0);
            if has_uvs {
                out.push('/');
                push_index(&mut out, pair.1);
            }
        }
        out
    }

    fn format_points(&self, geometry: &Geometry) -> String {
        let mut out = String::from("p");
        for declaration in &self.declarations {
            out.push(' ');
            push_index(&mut out, declaration.index(Channel::Position, geometry));
        }
        out
    }
}

fn push_index(out: &mut String, index: i64) {
    if index != 0 {
        out.push_str(&index.to_string());
    }
}

fn parse_group(group: &str, kind: ElementKind, strict: bool) -> Result<Declaration, ObjError> {
    let fields = match kind {
        ElementKind::Face => 3,
        ElementKind::Line => 2,
        ElementKind::Point => 1,
    };
    let mut declaration = Declaration::default();
    for (position, field) in group.split('/').enumerate() {
        if position >= fields {
            if kind == ElementKind::Point || strict {
                return Err(ObjError::ExtraFields { kind });
            }
            break;
        }
        if field.is_empty() {
            continue;
        }
        let index: i64 = field.parse().map_err(|source| ObjError::InvalidIndex {
            token: field.to_string(),
            source,
        })?;
        match position {
            0 => declaration.position = index,
            1 => declaration.uv = index,
            _ => declaration.normal = index,
        }
    }
    Ok(declaration)
}
