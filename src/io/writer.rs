// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! OBJ serializer

use crate::obj::{Channel, Document};
use crate::{APP_NAME, APP_URL, APP_VERSION};
use anyhow::Context;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serialize a document into any sink. Returns the number of lines written,
/// blank separators included.
pub fn write_to<W: Write>(document: &Document, sink: W) -> io::Result<usize> {
    let mut out = CountingWriter::new(sink);

    out.comment(&format!(
        "Processed with {} v{} | {}",
        APP_NAME, APP_VERSION, APP_URL
    ))?;
    out.blank()?;

    let comments = trim_comment_block(&document.comments);
    if !comments.is_empty() {
        for comment in comments {
            out.comment(comment)?;
        }
        out.blank()?;
    }

    if !document.material_libraries.is_empty() {
        for library in &document.material_libraries {
            out.line(&format!("mtllib {}", library))?;
        }
        out.blank()?;
    }

    for (position, &channel) in Channel::ALL.iter().enumerate() {
        let values = document.geometry.channel(channel);
        if values.is_empty() {
            continue;
        }
        if position > 0 {
            out.blank()?;
        }
        out.comment(&format!("{} [{}]", channel.label(), values.len()))?;
        out.blank()?;
        for value in values {
            out.line(&format!("{} {}", channel, value.format(channel)))?;
        }
    }
    out.blank()?;

    out.comment(&format!("objects [{}]", document.objects.len()))?;
    out.blank()?;

    for submesh in &document.objects {
        let comments = trim_comment_block(&submesh.comments);
        if !comments.is_empty() {
            for comment in comments {
                out.comment(comment)?;
            }
            out.blank()?;
        }
        out.line(&format!("{} {}", submesh.kind.keyword(), submesh.name))?;
        if !submesh.material.is_empty() {
            out.line(&format!("usemtl {}", submesh.material))?;
        }
        out.blank()?;
        for element in &submesh.elements {
            if let Some(group) = &element.smoothing_group {
                out.line(&format!("s {}", group))?;
            }
            out.line(&element.format(&document.geometry))?;
        }
        out.blank()?;
    }

    Ok(out.lines)
}

/// Serialize into a sink, gzip-compressing when a level is given.
pub fn write_sink<W: Write>(
    document: &Document,
    mut sink: W,
    gzip: Option<u32>,
) -> io::Result<usize> {
    match gzip {
        Some(level) => {
            let mut encoder = GzEncoder::new(&mut sink, Compression::new(level));
            let lines = write_to(document, &mut encoder)?;
            encoder.finish()?;
            Ok(lines)
        }
        None => write_to(document, &mut sink),
    }
}

/// Serialize to a file, replacing any previous content.
pub fn write_file(
    document: &Document,
    path: impl AsRef<Path>,
    gzip: Option<u32>,
) -> anyhow::Result<usize> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create output file {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let lines = write_sink(document, &mut writer, gzip)?;
    writer.flush()?;
    Ok(lines)
}

/// Serialize to an in-memory string, uncompressed.
pub fn write_string(document: &Document) -> String {
    let mut buffer = Vec::new();
    write_to(document, &mut buffer).expect("writing to memory cannot fail");
    String::from_utf8(buffer).expect("serializer emits UTF-8")
}

/// Drop empty comment lines from the edges of a block, keeping interior
/// blanks of long comments intact.
fn trim_comment_block(comments: &[String]) -> &[String] {
    let mut start = 0;
    let mut end = comments.len();
    while start < end && comments[start].is_empty() {
        start += 1;
    }
    while end > start && comments[end - 1].is_empty() {
        end -= 1;
    }
    &comments[start..end]
}

struct CountingWriter<W: Write> {
    sink: W,
    lines: usize,
}

impl<W: Write> CountingWriter<W> {
    fn new(sink: W) -> Self {
        Self { sink, lines: 0 }
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.sink, "{}", text)?;
        self.lines += 1;
        Ok(())
    }

    fn blank(&mut self) -> io::Result<()> {
        writeln!(self.sink)?;
        self.lines += 1;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            self.line("#")
        } else {
            writeln!(self.sink, "# {}", text)?;
            self.lines += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parser::{parse_str, ParseOptions};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn document_from(source: &str) -> Document {
        parse_str(source, &ParseOptions::default()).unwrap().document
    }

    #[test]
    fn test_write_basic_layout() {
        let document = document_from(
            "# header\n\
             mtllib scene.mtl\n\
             o cube\n\
             usemtl steel\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1 2 3\n",
        );
        let expected = format!(
            "# Processed with objslim v{} | {}\n\
             \n\
             # header\n\
             \n\
             mtllib scene.mtl\n\
             \n\
             # vertices [3]\n\
             \n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             \n\
             # objects [1]\n\
             \n\
             o cube\n\
             usemtl steel\n\
             \n\
             f 1 2 3\n\
             \n",
            APP_VERSION, APP_URL
        );
        assert_eq!(write_string(&document), expected);
    }

    #[test]
    fn test_line_count_matches_output() {
        let document = document_from(
            "o a\nv 0 0 0\nvn 0 1 0\nvt 0.5 0.5\nf 1/1/1 1/1/1 1/1/1\n",
        );
        let mut buffer = Vec::new();
        let lines = write_to(&document, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(lines, text.lines().count());
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_channel_blocks_are_labeled_and_separated() {
        let document = document_from("v 0 0 0\nvn 0 1 0\nvt 0.25 0.75\nf 1/1/1 1/1/1 1/1/1\n");
        let text = write_string(&document);
        assert!(text.contains("# vertices [1]\n\nv 0 0 0\n"));
        assert!(text.contains("\n\n# normals [1]\n\nvn 0 1 0\n"));
        assert!(text.contains("\n\n# uvs [1]\n\nvt 0.25 0.75\n"));
    }

    #[test]
    fn test_comment_block_trimming() {
        let mut document = document_from("o a\nv 0 0 0\nf 1 1 1\n");
        document.comments = vec![
            String::new(),
            "first".to_string(),
            String::new(),
            "last".to_string(),
            String::new(),
        ];
        let text = write_string(&document);
        assert!(text.contains("first\n#\n# last\n"));
        assert!(!text.contains("\n#\n# first"));
    }

    #[test]
    fn test_smoothing_groups_are_emitted_before_their_element() {
        let document = document_from(
            "o a\nv 0 0 0\ns 1\nf 1 1 1\nf 1 1 1\ns off\nf 1 1 1\n",
        );
        let text = write_string(&document);
        assert!(text.contains("s 1\nf 1 1 1\nf 1 1 1\ns off\nf 1 1 1\n"));
    }

    #[test]
    fn test_material_line_skipped_when_empty() {
        let document = document_from("o bare\nv 0 0 0\nf 1 1 1\n");
        let text = write_string(&document);
        assert!(!text.contains("usemtl"));
    }

    #[test]
    fn test_gzip_sink_produces_decodable_stream() {
        let document = document_from("o a\nv 0 0 0\nf 1 1 1\n");
        let mut compressed = Vec::new();
        let lines = write_sink(&document, &mut compressed, Some(6)).unwrap();
        assert!(lines > 0);
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);

        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, write_string(&document));
    }
}
