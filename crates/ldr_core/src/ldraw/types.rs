//! Decoded LDraw records and parsed-file types.
//!
//! These are the intermediate representation between the text of a single
//! file and the instance tree built by the loader.

use std::path::PathBuf;

use ldr_math::{Mat4, Vec3};

use crate::color::ColorCode;
use crate::ldraw::parser::LineError;
use crate::mesh::Mesh;

/// Whether a file is a standalone part or a reusable fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PartKind {
    /// The file's `!LDRAW_ORG` header declares a part.
    Part,

    /// A primitive, subpart, model, or any file without a part header.
    #[default]
    Primitive,
}

/// A type 1 line: a placed reference to another file.
#[derive(Clone, Debug, PartialEq)]
pub struct SubfileRef {
    /// Referenced filename with separators normalized
    pub name: String,

    /// Placement of the referenced file, relative to the referencing frame
    pub transform: Mat4,

    /// Color code the file is referenced with
    pub color: ColorCode,
}

/// One decoded, non-blank source line.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandRecord {
    /// Line type 0. `header` is set for `!LDRAW_ORG` lines.
    Comment {
        tokens: Vec<String>,
        header: Option<PartKind>,
    },

    /// Line type 1
    Subfile(SubfileRef),

    /// Line type 2
    Line { color: ColorCode, points: [Vec3; 2] },

    /// Line type 3
    Triangle { color: ColorCode, points: [Vec3; 3] },

    /// Line type 4. `order` is the corrected emission order of the corners.
    Quad {
        color: ColorCode,
        points: [Vec3; 4],
        order: [u32; 4],
    },

    /// Line type 5: two points plus two control points.
    OptionalLine {
        color: ColorCode,
        points: [Vec3; 2],
        controls: [Vec3; 2],
    },
}

/// The result of parsing one file's own commands, before any reference is
/// followed. Never mutated once the parser returns it.
#[derive(Clone, Debug, Default)]
pub struct ParsedPart {
    /// Canonical filename (cache key)
    pub name: String,

    /// Location the file was read from
    pub path: PathBuf,

    /// Part or fragment, from the file header
    pub kind: PartKind,

    /// Local geometry of this file only
    pub mesh: Mesh,

    /// Type 1 references in file order
    pub subfiles: Vec<SubfileRef>,

    /// Number of type 5 lines seen
    pub optional_lines: usize,

    /// Recoverable problems found while decoding
    pub errors: Vec<LineError>,
}

impl ParsedPart {
    /// True when at least one line was skipped or malformed.
    pub fn had_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_part(&self) -> bool {
        self.kind == PartKind::Part
    }
}
