// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Streaming OBJ line parser

use crate::obj::{Channel, Document, Element, ElementKind, Keyword, ObjError, SubMeshKind};
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Parser switches.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Fail on malformed payload tails instead of truncating them.
    pub strict: bool,
    /// Name for a sub-mesh created implicitly when elements appear before
    /// any `o`/`g` line. The CLI passes the input file's basename.
    pub default_object: Option<String>,
}

/// Parsed document plus the counters the summary needs. The object/group
/// counts record the declarations actually seen in the input, not the
/// synthetic sub-meshes added for multi-material splits.
#[derive(Debug)]
pub struct ParseOutput {
    pub document: Document,
    pub lines: usize,
    pub objects: usize,
    pub groups: usize,
}

/// Parse failure with the 1-based source line.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: ObjError,
    },

    #[error("failed to read input at line {line}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// Parse an OBJ document from a buffered reader. Any malformed line aborts
/// the whole ingestion, there is no partial recovery.
pub fn parse<R: BufRead>(reader: R, options: &ParseOptions) -> Result<ParseOutput, ParseError> {
    let mut parser = Parser::new(options);
    let mut line_number = 0;
    for line in reader.lines() {
        line_number += 1;
        let line = line.map_err(|source| ParseError::Io {
            line: line_number,
            source,
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        parser.handle(line).map_err(|source| ParseError::Invalid {
            line: line_number,
            source,
        })?;
    }
    Ok(ParseOutput {
        document: parser.document,
        lines: line_number,
        objects: parser.objects,
        groups: parser.groups,
    })
}

pub fn parse_str(source: &str, options: &ParseOptions) -> Result<ParseOutput, ParseError> {
    parse(source.as_bytes(), options)
}

pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> anyhow::Result<ParseOutput> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open input file {:?}", path))?;
    Ok(parse(BufReader::new(file), options)?)
}

/// Comments carrying these tokens are statistics from an earlier tool run,
/// they would be stale after processing and are dropped.
const STALE_SUMMARY_TOKENS: [&str; 6] = [
    "vertices",
    "normals",
    "uvs",
    "texture coords",
    "polygons",
    "triangles",
];

fn contains_stale_summary(comment: &str) -> bool {
    let lowered = comment.to_lowercase();
    STALE_SUMMARY_TOKENS
        .iter()
        .any(|token| lowered.contains(token))
}

struct Parser<'a> {
    options: &'a ParseOptions,
    document: Document,
    /// Receiver of elements and comments, an index into `document.objects`.
    current: Option<usize>,
    /// Name stem for synthetic multi-material siblings.
    current_name: String,
    child_count: usize,
    material: String,
    /// Pending `s` value, attached to the next element only.
    smoothing_group: Option<String>,
    objects: usize,
    groups: usize,
}

impl<'a> Parser<'a> {
    fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            document: Document::new(),
            current: None,
            current_name: String::new(),
            child_count: 0,
            material: String::new(),
            smoothing_group: None,
            objects: 0,
            groups: 0,
        }
    }

    fn handle(&mut self, line: &str) -> Result<(), ObjError> {
        let (token, value) = match line.split_once(' ') {
            Some((token, value)) => (token, value.trim()),
            None => (line, ""),
        };
        let Some(keyword) = Keyword::parse(token) else {
            return Err(ObjError::UnsupportedKeyword {
                keyword: token.to_string(),
            });
        };

        match keyword {
            Keyword::Comment => self.comment(value),
            Keyword::MtlLib => self.document.material_libraries.push(value.to_string()),
            Keyword::UseMtl => self.use_material(value),
            Keyword::Object => self.start_submesh(SubMeshKind::Object, value),
            Keyword::Group => self.start_submesh(SubMeshKind::Group, value),
            Keyword::SmoothingGroup => {
                self.smoothing_group = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            Keyword::Vertex => {
                self.document
                    .geometry
                    .read_value(Channel::Position, value, self.options.strict)?;
            }
            Keyword::Normal => {
                self.document
                    .geometry
                    .read_value(Channel::Normal, value, self.options.strict)?;
            }
            Keyword::Uv => {
                self.document
                    .geometry
                    .read_value(Channel::Uv, value, self.options.strict)?;
            }
            Keyword::Param => {
                self.document
                    .geometry
                    .read_value(Channel::Param, value, self.options.strict)?;
            }
            Keyword::Face => self.element(ElementKind::Face, value)?,
            Keyword::Line => self.element(ElementKind::Line, value)?,
            Keyword::Point => self.element(ElementKind::Point, value)?,
            Keyword::Curve | Keyword::Curve2 | Keyword::Surface => {
                return Err(ObjError::UnsupportedKeyword {
                    keyword: keyword.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    fn comment(&mut self, value: &str) {
        // Before any sub-mesh or material library the comment documents the
        // file itself. Comments between a mtllib line and the first sub-mesh
        // have no owner and are dropped.
        if self.current.is_none() && self.document.material_libraries.is_empty() {
            self.document.comments.push(value.to_string());
            return;
        }
        if let Some(index) = self.current {
            if !value.is_empty() && !contains_stale_summary(value) {
                self.document.objects[index].comments.push(value.to_string());
            }
        }
    }

    fn start_submesh(&mut self, kind: SubMeshKind, name: &str) {
        match kind {
            SubMeshKind::Object => self.objects += 1,
            SubMeshKind::Group => self.groups += 1,
        }
        let index = self.document.create_object(kind, name, &self.material);
        self.current = Some(index);
        self.current_name = self.document.objects[index].name.clone();
        self.child_count = 0;
    }

    fn use_material(&mut self, value: &str) {
        // A material switch inside a populated sub-mesh splits off a
        // synthetic sibling so elements stay in single-material units.
        if let Some(index) = self.current {
            let submesh = &self.document.objects[index];
            if !submesh.elements.is_empty() && submesh.material != value {
                self.child_count += 1;
                let name = format!("{}_{}", self.current_name, self.child_count);
                let kind = submesh.kind;
                let index = self.document.create_object(kind, &name, value);
                self.current = Some(index);
            }
        }
        self.material = value.to_string();
        if let Some(index) = self.current {
            self.document.objects[index].material = self.material.clone();
        }
    }

    fn element(&mut self, kind: ElementKind, value: &str) -> Result<(), ObjError> {
        let index = match self.current {
            Some(index) => index,
            None => {
                let name = self.options.default_object.clone().unwrap_or_default();
                let index =
                    self.document
                        .create_object(SubMeshKind::Object, &name, &self.material);
                self.current = Some(index);
                self.current_name = self.document.objects[index].name.clone();
                self.child_count = 0;
                index
            }
        };
        let mut element = Element::parse(kind, value, self.options.strict)?;
        element.resolve(&self.document.geometry)?;
        element.smoothing_group = self.smoothing_group.take();
        self.document.objects[index].elements.push(element);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> ParseOutput {
        parse_str(source, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_basic_document() {
        let output = parse_ok(
            "# exported scene\n\
             mtllib scene.mtl\n\
             o cube\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1 2 3\n",
        );
        assert_eq!(output.lines, 7);
        assert_eq!(output.objects, 1);
        assert_eq!(output.groups, 0);

        let document = &output.document;
        assert_eq!(document.comments, vec!["exported scene"]);
        assert_eq!(document.material_libraries, vec!["scene.mtl"]);
        assert_eq!(document.geometry.positions.len(), 3);
        assert_eq!(document.objects.len(), 1);
        assert_eq!(document.objects[0].name, "cube");
        assert_eq!(document.objects[0].elements.len(), 1);
    }

    #[test]
    fn test_parse_tolerates_crlf_and_blanks() {
        let output = parse_ok("v 0 0 0\r\n\r\nv 1 1 1\r\n");
        assert_eq!(output.document.geometry.positions.len(), 2);
        assert_eq!(output.lines, 3);
    }

    #[test]
    fn test_comment_routing() {
        let output = parse_ok(
            "# header one\n\
             #\n\
             mtllib a.mtl\n\
             # orphaned between mtllib and objects\n\
             o thing\n\
             # kept object note\n\
             # 1234 vertices\n\
             # Triangles: 50\n\
             v 0 0 0\n\
             f 1 1 1\n",
        );
        let document = &output.document;
        assert_eq!(document.comments, vec!["header one", ""]);
        // Stale statistic comments and the unowned one are dropped.
        assert_eq!(document.objects[0].comments, vec!["kept object note"]);
    }

    #[test]
    fn test_multi_material_split() {
        let output = parse_ok(
            "o A\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             usemtl m1\n\
             f 1 2 3\n\
             usemtl m2\n\
             f 1 2 3\n\
             f 3 2 1\n",
        );
        let document = &output.document;
        assert_eq!(document.objects.len(), 2);
        assert_eq!(document.objects[0].name, "A");
        assert_eq!(document.objects[0].material, "m1");
        assert_eq!(document.objects[0].elements.len(), 1);
        assert_eq!(document.objects[1].name, "A_1");
        assert_eq!(document.objects[1].material, "m2");
        assert_eq!(document.objects[1].elements.len(), 2);
        // Synthetic siblings do not inflate the declared-object counter.
        assert_eq!(output.objects, 1);
    }

    #[test]
    fn test_material_switch_without_elements_reuses_submesh() {
        let output = parse_ok(
            "o A\n\
             usemtl m1\n\
             usemtl m2\n\
             v 0 0 0\n\
             f 1 1 1\n",
        );
        let document = &output.document;
        assert_eq!(document.objects.len(), 1);
        assert_eq!(document.objects[0].material, "m2");
    }

    #[test]
    fn test_repeated_material_does_not_split() {
        let output = parse_ok(
            "o A\n\
             v 0 0 0\n\
             usemtl m1\n\
             f 1 1 1\n\
             usemtl m1\n\
             f 1 1 1\n",
        );
        assert_eq!(output.document.objects.len(), 1);
        assert_eq!(output.document.objects[0].elements.len(), 2);
    }

    #[test]
    fn test_implicit_object_uses_default_name() {
        let options = ParseOptions {
            default_object: Some("scene".to_string()),
            ..Default::default()
        };
        let output = parse_str("v 0 0 0\nf 1 1 1\n", &options).unwrap();
        assert_eq!(output.document.objects.len(), 1);
        assert_eq!(output.document.objects[0].name, "scene");
        assert_eq!(output.objects, 0);

        let unnamed = parse_ok("v 0 0 0\nf 1 1 1\n");
        assert_eq!(unnamed.document.objects[0].name, "object_1");
    }

    #[test]
    fn test_negative_indices_resolve_against_declared_count() {
        let mut source = String::new();
        for i in 0..10 {
            source.push_str(&format!("v {} 0 0\n", i));
        }
        source.push_str("f -1 -2 -3\n");

        let output = parse_ok(&source);
        let declarations = &output.document.objects[0].elements[0].declarations;
        assert_eq!(declarations[0].position, 10);
        assert_eq!(declarations[1].position, 9);
        assert_eq!(declarations[2].position, 8);
    }

    #[test]
    fn test_index_out_of_bounds_reports_line() {
        let err = parse_str("v 0 0 0\nf 1 2 1\n", &ParseOptions::default()).unwrap_err();
        match err {
            ParseError::Invalid { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(source, ObjError::IndexOutOfBounds { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_keyword_reports_line() {
        let err = parse_str("v 0 0 0\n\nxyz 1 2\n", &ParseOptions::default()).unwrap_err();
        match err {
            ParseError::Invalid { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(source, ObjError::UnsupportedKeyword { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parse_str("curv 0.1 0.2 1 2\n", &ParseOptions::default()).is_err());
    }

    #[test]
    fn test_smoothing_group_attaches_to_next_element_only() {
        let output = parse_ok(
            "v 0 0 0\n\
             s 1\n\
             f 1 1 1\n\
             f 1 1 1\n\
             s off\n\
             f 1 1 1\n",
        );
        let elements = &output.document.objects[0].elements;
        assert_eq!(elements[0].smoothing_group.as_deref(), Some("1"));
        assert_eq!(elements[1].smoothing_group, None);
        assert_eq!(elements[2].smoothing_group.as_deref(), Some("off"));
    }

    #[test]
    fn test_strict_mode_propagates() {
        let source = "v 0 0 0\nv 1 1 1\nv 2 2 2\nv 3 3 3\nv 4 4 4\nf 1 2 3 4 5\n";
        assert!(parse_str(source, &ParseOptions::default()).is_ok());
        let strict = ParseOptions {
            strict: true,
            ..Default::default()
        };
        assert!(parse_str(source, &strict).is_err());
    }

    #[test]
    fn test_groups_counted_separately() {
        let output = parse_ok("o a\ng b\ng c\n");
        assert_eq!(output.objects, 1);
        assert_eq!(output.groups, 2);
        assert_eq!(output.document.objects_of(SubMeshKind::Group).count(), 2);
    }
}
