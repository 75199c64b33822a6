// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! Line keywords and the closed tag enums derived from them

use std::fmt;

/// Leading token of an OBJ line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Comment,
    MtlLib,
    UseMtl,
    Object,
    Group,
    SmoothingGroup,
    Vertex,
    Normal,
    Uv,
    Param,
    Face,
    Line,
    Point,
    Curve,
    Curve2,
    Surface,
}

impl Keyword {
    /// Map a raw line token to its keyword, if it is one.
    pub fn parse(token: &str) -> Option<Keyword> {
        let keyword = match token {
            "#" => Keyword::Comment,
            "mtllib" => Keyword::MtlLib,
            "usemtl" => Keyword::UseMtl,
            "o" => Keyword::Object,
            "g" => Keyword::Group,
            "s" => Keyword::SmoothingGroup,
            "v" => Keyword::Vertex,
            "vn" => Keyword::Normal,
            "vt" => Keyword::Uv,
            "vp" => Keyword::Param,
            "f" => Keyword::Face,
            "l" => Keyword::Line,
            "p" => Keyword::Point,
            "curv" => Keyword::Curve,
            "curv2" => Keyword::Curve2,
            "surf" => Keyword::Surface,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Comment => "#",
            Keyword::MtlLib => "mtllib",
            Keyword::UseMtl => "usemtl",
            Keyword::Object => "o",
            Keyword::Group => "g",
            Keyword::SmoothingGroup => "s",
            Keyword::Vertex => "v",
            Keyword::Normal => "vn",
            Keyword::Uv => "vt",
            Keyword::Param => "vp",
            Keyword::Face => "f",
            Keyword::Line => "l",
            Keyword::Point => "p",
            Keyword::Curve => "curv",
            Keyword::Curve2 => "curv2",
            Keyword::Surface => "surf",
        }
    }
}

/// Geometry channel: one of the four numeric declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Normal,
    Uv,
    Param,
}

impl Channel {
    /// All channels in declaration/serialization order.
    pub const ALL: [Channel; 4] = [Channel::Position, Channel::Normal, Channel::Uv, Channel::Param];

    /// Channels that elements can reference. Params are declared but never cited.
    pub const CITED: [Channel; 3] = [Channel::Position, Channel::Uv, Channel::Normal];

    pub fn keyword(&self) -> &'static str {
        match self {
            Channel::Position => "v",
            Channel::Normal => "vn",
            Channel::Uv => "vt",
            Channel::Param => "vp",
        }
    }

    /// Plural label used in block comments and the summary.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Position => "vertices",
            Channel::Normal => "normals",
            Channel::Uv => "uvs",
            Channel::Param => "params",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Topology element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Face,
    Line,
    Point,
}

impl ElementKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ElementKind::Face => "f",
            ElementKind::Line => "l",
            ElementKind::Point => "p",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Face => "face",
            ElementKind::Line => "line",
            ElementKind::Point => "point",
        };
        f.write_str(name)
    }
}

/// Declared grouping kind of a sub-mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubMeshKind {
    Object,
    Group,
}

impl SubMeshKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            SubMeshKind::Object => "o",
            SubMeshKind::Group => "g",
        }
    }

    /// Singular label, also the stem for auto-generated names.
    pub fn label(&self) -> &'static str {
        match self {
            SubMeshKind::Object => "object",
            SubMeshKind::Group => "group",
        }
    }
}

impl fmt::Display for SubMeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for token in ["#", "mtllib", "usemtl", "o", "g", "s", "v", "vn", "vt", "vp", "f", "l", "p"] {
            let keyword = Keyword::parse(token).unwrap();
            assert_eq!(keyword.as_str(), token);
        }
    }

    #[test]
    fn test_unknown_keyword() {
        assert!(Keyword::parse("vv").is_none());
        assert!(Keyword::parse("").is_none());
        assert!(Keyword::parse("#comment").is_none());
    }

    #[test]
    fn test_channel_labels() {
        assert_eq!(Channel::Position.keyword(), "v");
        assert_eq!(Channel::Position.label(), "vertices");
        assert_eq!(Channel::Uv.label(), "uvs");
        assert_eq!(Channel::ALL.len(), 4);
        assert!(!Channel::CITED.contains(&Channel::Param));
    }

    #[test]
    fn test_submesh_kind() {
        assert_eq!(SubMeshKind::Object.keyword(), "o");
        assert_eq!(SubMeshKind::Group.label(), "group");
    }
}
