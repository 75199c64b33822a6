// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Parsed OBJ document: geometry channels plus the ordered sub-mesh list

use super::{Channel, Element, ElementKind, Geometry, GeometryStats, SubMeshKind};
use serde::Serialize;

/// One `o`/`g` unit with its topology elements.
#[derive(Debug, Clone)]
pub struct SubMesh {
    pub kind: SubMeshKind,
    pub name: String,
    pub material: String,
    /// Preserved comment lines re-emitted before the declaration.
    pub comments: Vec<String>,
    pub elements: Vec<Element>,
}

impl SubMesh {
    pub fn new(kind: SubMeshKind, name: String, material: String) -> Self {
        Self {
            kind,
            name,
            material,
            comments: Vec::new(),
            elements: Vec::new(),
        }
    }
}

/// Root of the parsed model. Created once at parse start and mutated in
/// place by every later stage.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub geometry: Geometry,
    pub material_libraries: Vec<String>,
    /// Document-level comments preceding any sub-mesh or mtllib line.
    pub comments: Vec<String>,
    pub objects: Vec<SubMesh>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sub-mesh and return its index. An empty name auto-names the
    /// unit `{kind}_{n}` where n counts existing units of that kind.
    pub fn create_object(&mut self, kind: SubMeshKind, name: &str, material: &str) -> usize {
        let name = if name.is_empty() {
            format!("{}_{}", kind.label(), self.objects_of(kind).count() + 1)
        } else {
            name.to_string()
        };
        self.objects.push(SubMesh::new(kind, name, material.to_string()));
        self.objects.len() - 1
    }

    pub fn objects_of(&self, kind: SubMeshKind) -> impl Iterator<Item = &SubMesh> {
        self.objects.iter().filter(move |submesh| submesh.kind == kind)
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            geometry: self.geometry.stats(),
            ..Default::default()
        };
        for submesh in &self.objects {
            match submesh.kind {
                SubMeshKind::Object => stats.objects += 1,
                SubMeshKind::Group => stats.groups += 1,
            }
            for element in &submesh.elements {
                match element.kind {
                    ElementKind::Face => stats.faces += 1,
                    ElementKind::Line => stats.lines += 1,
                    ElementKind::Point => stats.points += 1,
                }
            }
        }
        stats
    }

    /// Drop discarded geometry values and restore the dense 1..N index
    /// invariant, remapping every declaration slot that pointed past a
    /// removed value. A slot held by a discarded value is a bug in the
    /// rewrite that flagged it.
    pub fn compact_geometry(&mut self) {
        for channel in Channel::ALL {
            if !self.geometry.channel(channel).iter().any(|value| value.discard) {
                continue;
            }

            let mut remap = vec![usize::MAX; self.geometry.channel(channel).len()];
            {
                let values = self.geometry.channel_mut(channel);
                let mut kept = Vec::with_capacity(values.len());
                for (slot, value) in values.iter().enumerate() {
                    if value.discard {
                        continue;
                    }
                    let mut value = *value;
                    value.index = kept.len() + 1;
                    remap[slot] = kept.len();
                    kept.push(value);
                }
                *values = kept;
            }

            for submesh in &mut self.objects {
                for element in &mut submesh.elements {
                    for declaration in &mut element.declarations {
                        let Some((_, slot)) = declaration.cite_mut(channel) else {
                            continue;
                        };
                        let Some(current) = *slot else {
                            continue;
                        };
                        let target = remap[current];
                        assert!(
                            target != usize::MAX,
                            "{} declaration still references discarded slot {}",
                            channel,
                            current
                        );
                        *slot = Some(target);
                    }
                }
            }
        }
    }
}

/// Document-wide counts used by the summary report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub objects: usize,
    pub groups: usize,
    pub faces: usize,
    pub lines: usize,
    pub points: usize,
    pub geometry: GeometryStats,
}
