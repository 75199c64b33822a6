// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Merges sub-meshes that share a material

use crate::cli::Reporter;
use crate::config::Config;
use crate::obj::{Document, SubMesh};
use crate::process::Processor;
use anyhow::Result;

/// Sub-meshes sharing one material, in first-seen order. A plain vector
/// keeps the output stable where a map would shuffle keys between runs.
struct MaterialGroup {
    material: String,
    members: Vec<SubMesh>,
}

fn merged_name(members: &[SubMesh]) -> String {
    let parts: Vec<&str> = members
        .iter()
        .filter(|submesh| !submesh.name.is_empty())
        .map(|submesh| submesh.name.as_str())
        .collect();
    if parts.is_empty() {
        return "Unnamed".to_string();
    }
    parts.join(" ")
}

pub struct Merge;

impl Processor for Merge {
    fn name(&self) -> &'static str {
        "Merge"
    }

    fn desc(&self) -> &'static str {
        "Merges objects and groups with the same material into a single mesh."
    }

    fn enabled(&self, config: &Config) -> bool {
        config.merge
    }

    fn execute(
        &self,
        document: &mut Document,
        _config: &Config,
        reporter: &Reporter,
    ) -> Result<()> {
        let mut groups: Vec<MaterialGroup> = Vec::new();
        for submesh in document.objects.drain(..) {
            // sub-meshes without elements have nothing to contribute
            if submesh.elements.is_empty() {
                continue;
            }
            match groups
                .iter_mut()
                .find(|group| group.material == submesh.material)
            {
                Some(group) => group.members.push(submesh),
                None => groups.push(MaterialGroup {
                    material: submesh.material.clone(),
                    members: vec![submesh],
                }),
            }
        }
        reporter.info(&format!("  - Found {} unique materials", groups.len()));

        for group in groups {
            let name = merged_name(&group.members);
            let kind = group.members[0].kind;
            let index = document.create_object(kind, &name, &group.material);
            for member in group.members {
                document.objects[index].elements.extend(member.elements);
            }
        }
        Ok(())
    }
}
