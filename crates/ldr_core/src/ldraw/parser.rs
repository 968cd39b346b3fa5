//! LDraw line decoder and single-file parser.
//!
//! # Supported Syntax
//!
//! - `0 ...` comments and meta commands (`0 !LDRAW_ORG Part ...` is recognized)
//! - `1 <color> x y z a b c d e f g h i <file>` sub-file references
//! - `2 <color> x1 y1 z1 x2 y2 z2` lines
//! - `3 <color> <3 points>` triangles
//! - `4 <color> <4 points>` quads
//! - `5 <color> <4 points>` optional lines
//!
//! A malformed line never aborts a parse. It is skipped and recorded as a
//! [`LineError`] on the resulting [`ParsedPart`].

use std::path::PathBuf;

use ldr_math::{ldraw_matrix, Mat4, Vec3};
use thiserror::Error;

use crate::color::ColorCode;
use crate::ldraw::resolver::canonical_name;
use crate::ldraw::types::{CommandRecord, ParsedPart, PartKind, SubfileRef};

/// Token count of a complete type 1 line, including the line type.
const SUBFILE_TOKENS: usize = 15;

/// Why a line was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineErrorKind {
    #[error("line type {line_type} needs {expected} tokens, found {found}")]
    TooFewTokens {
        line_type: u8,
        expected: usize,
        found: usize,
    },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid color code '{0}'")]
    InvalidColor(String),

    #[error("unknown line type '{0}'")]
    UnknownLineType(String),

    #[error("{0} unexpected tokens after the filename")]
    TrailingTokens(usize),
}

/// A recoverable problem on one source line.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {kind}")]
pub struct LineError {
    /// 1-based line number
    pub line: usize,
    pub kind: LineErrorKind,
}

/// Result type for decoding a single line.
pub type DecodeResult<T> = Result<T, LineErrorKind>;

/// Decode one whitespace-split line.
///
/// `transform` is the accumulated transform of the enclosing context: points
/// are mapped through it, and sub-file placements are left-multiplied by it.
/// Color codes are kept as written; inherit substitution happens when the
/// reference tree is resolved.
///
/// Returns `Ok(None)` for an empty token list.
pub fn decode_line(tokens: &[&str], transform: &Mat4) -> DecodeResult<Option<CommandRecord>> {
    let Some(&line_type) = tokens.first() else {
        return Ok(None);
    };

    let record = match line_type {
        "0" => decode_comment(tokens),
        "1" => {
            require(tokens, 1, SUBFILE_TOKENS)?;
            let color = parse_color(tokens[1])?;
            let values = parse_floats::<12>(&tokens[2..14])?;
            CommandRecord::Subfile(SubfileRef {
                name: canonical_name(tokens[14]),
                transform: *transform * ldraw_matrix(values),
                color,
            })
        }
        "2" => {
            let (color, points) = decode_points::<2>(tokens, 2, transform)?;
            CommandRecord::Line { color, points }
        }
        "3" => {
            let (color, points) = decode_points::<3>(tokens, 3, transform)?;
            CommandRecord::Triangle { color, points }
        }
        "4" => {
            let (color, points) = decode_points::<4>(tokens, 4, transform)?;
            CommandRecord::Quad {
                color,
                points,
                order: quad_order(&points),
            }
        }
        "5" => {
            let (color, all) = decode_points::<4>(tokens, 5, transform)?;
            CommandRecord::OptionalLine {
                color,
                points: [all[0], all[1]],
                controls: [all[2], all[3]],
            }
        }
        other => return Err(LineErrorKind::UnknownLineType(other.to_string())),
    };

    Ok(Some(record))
}

fn decode_comment(tokens: &[&str]) -> CommandRecord {
    let header = match tokens.get(1) {
        Some(meta) if meta.eq_ignore_ascii_case("!LDRAW_ORG") => {
            Some(header_kind(tokens.get(2).copied()))
        }
        _ => None,
    };

    CommandRecord::Comment {
        tokens: tokens[1..].iter().map(|t| t.to_string()).collect(),
        header,
    }
}

/// Classify the type token of a `!LDRAW_ORG` header.
///
/// Any type containing `part` in any case declares a part: `Part`,
/// `Unofficial_Part`, `Subpart`, `Part_Alias` and so on. `Primitive`,
/// `Shortcut` and the like, or a missing type, do not.
fn header_kind(type_token: Option<&str>) -> PartKind {
    match type_token {
        Some(token) if token.to_ascii_lowercase().contains("part") => PartKind::Part,
        _ => PartKind::Primitive,
    }
}

fn require(tokens: &[&str], line_type: u8, expected: usize) -> DecodeResult<()> {
    if tokens.len() < expected {
        return Err(LineErrorKind::TooFewTokens {
            line_type,
            expected,
            found: tokens.len(),
        });
    }
    Ok(())
}

fn parse_color(token: &str) -> DecodeResult<ColorCode> {
    token
        .parse()
        .map_err(|_| LineErrorKind::InvalidColor(token.to_string()))
}

fn parse_floats<const N: usize>(tokens: &[&str]) -> DecodeResult<[f32; N]> {
    let mut values = [0.0f32; N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = token
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LineErrorKind::InvalidNumber(token.to_string()))?;
    }
    Ok(values)
}

/// Decode `N` points following the color token. Extra trailing tokens are
/// ignored.
fn decode_points<const N: usize>(
    tokens: &[&str],
    line_type: u8,
    transform: &Mat4,
) -> DecodeResult<(ColorCode, [Vec3; N])> {
    require(tokens, line_type, 2 + N * 3)?;
    let color = parse_color(tokens[1])?;

    let mut points = [Vec3::ZERO; N];
    for (i, point) in points.iter_mut().enumerate() {
        let start = 2 + i * 3;
        let [x, y, z] = parse_floats::<3>(&tokens[start..start + 3])?;
        *point = transform.transform_point3(Vec3::new(x, y, z));
    }

    Ok((color, points))
}

/// Emission order for a quad's corners.
///
/// With `nA = (v1-v0) x (v2-v0)` and `nB = (v2-v1) x (v3-v1)`, a negative
/// `nA . nB` means the corners are listed in bowtie order, and `v2`/`v3`
/// are swapped.
pub fn quad_order(v: &[Vec3; 4]) -> [u32; 4] {
    let n_a = (v[1] - v[0]).cross(v[2] - v[0]);
    let n_b = (v[2] - v[1]).cross(v[3] - v[1]);

    if n_a.dot(n_b) < 0.0 {
        [0, 1, 3, 2]
    } else {
        [0, 1, 2, 3]
    }
}

/// Parser for the text of a single LDraw file.
pub struct PartParser<'a> {
    name: String,
    path: PathBuf,
    content: &'a str,
}

impl<'a> PartParser<'a> {
    /// Create a parser. `name` is the canonical cache key of the file.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, content: &'a str) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content,
        }
    }

    /// Parse every line into a frozen [`ParsedPart`].
    pub fn parse(self) -> ParsedPart {
        let mut part = ParsedPart {
            name: self.name,
            path: self.path,
            ..Default::default()
        };

        // The header only counts before the first non-comment line.
        let mut in_header = true;

        for (index, raw) in self.content.lines().enumerate() {
            let line = index + 1;
            let tokens: Vec<&str> = raw.split_whitespace().collect();

            let record = match decode_line(&tokens, &Mat4::IDENTITY) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(kind) => {
                    log::debug!("{}: skipping line {}: {}", part.name, line, kind);
                    part.errors.push(LineError { line, kind });
                    continue;
                }
            };

            match record {
                CommandRecord::Comment { header, .. } => {
                    if let (true, Some(kind)) = (in_header, header) {
                        part.kind = kind;
                    }
                    continue;
                }
                CommandRecord::Subfile(subfile) => {
                    if tokens.len() > SUBFILE_TOKENS {
                        part.errors.push(LineError {
                            line,
                            kind: LineErrorKind::TrailingTokens(tokens.len() - SUBFILE_TOKENS),
                        });
                    }
                    part.subfiles.push(subfile);
                }
                CommandRecord::Line { points, .. } => part.mesh.push_line(points),
                CommandRecord::Triangle { color, points } => part.mesh.push_triangle(points, color),
                CommandRecord::Quad { color, points, order } => {
                    part.mesh.push_quad(points, order, color)
                }
                CommandRecord::OptionalLine { .. } => part.optional_lines += 1,
            }
            in_header = false;
        }

        log::debug!(
            "Parsed {}: {} points, {} faces, {} references{}",
            part.name,
            part.mesh.points.len(),
            part.mesh.faces.len(),
            part.subfiles.len(),
            if part.had_errors() { " (with errors)" } else { "" }
        );

        part
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Polygon;

    fn decode(line: &str) -> DecodeResult<Option<CommandRecord>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        decode_line(&tokens, &Mat4::IDENTITY)
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode("   ").unwrap(), None);
    }

    #[test]
    fn test_decode_header() {
        let record = decode("0 !LDRAW_ORG Part UPDATE 2004-03").unwrap().unwrap();
        match record {
            CommandRecord::Comment { header, tokens } => {
                assert_eq!(header, Some(PartKind::Part));
                assert_eq!(tokens[0], "!LDRAW_ORG");
            }
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn test_header_kinds() {
        assert_eq!(header_kind(Some("part")), PartKind::Part);
        assert_eq!(header_kind(Some("Unofficial_Part")), PartKind::Part);
        assert_eq!(header_kind(Some("Subpart")), PartKind::Part);
        assert_eq!(header_kind(Some("Unofficial_Subpart")), PartKind::Part);
        assert_eq!(header_kind(Some("Part_Alias")), PartKind::Part);
        assert_eq!(header_kind(Some("Primitive")), PartKind::Primitive);
        assert_eq!(header_kind(Some("Unofficial_Primitive")), PartKind::Primitive);
        assert_eq!(header_kind(Some("Shortcut")), PartKind::Primitive);
        assert_eq!(header_kind(None), PartKind::Primitive);

        let bare = decode("0 !ldraw_org").unwrap().unwrap();
        assert!(matches!(
            bare,
            CommandRecord::Comment { header: Some(PartKind::Primitive), .. }
        ));
    }

    #[test]
    fn test_decode_subfile() {
        let record = decode("1 4 10 20 30 1 0 0 0 1 0 0 0 1 s\\3001s01.dat")
            .unwrap()
            .unwrap();
        let CommandRecord::Subfile(subfile) = record else {
            panic!("expected subfile");
        };
        assert_eq!(subfile.name, "s/3001s01.dat");
        assert_eq!(subfile.color, ColorCode::Palette(4));
        let origin = subfile.transform.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_decode_subfile_composes_with_context() {
        let tokens: Vec<&str> = "1 16 1 0 0 1 0 0 0 1 0 0 0 1 a.dat".split_whitespace().collect();
        let context = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let Some(CommandRecord::Subfile(subfile)) = decode_line(&tokens, &context).unwrap() else {
            panic!("expected subfile");
        };
        assert_eq!(subfile.color, ColorCode::Inherit);
        assert_eq!(subfile.transform.transform_point3(Vec3::ZERO), Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn test_decode_truncated_subfile() {
        let err = decode("1 16 0 0 0 1 0 0").unwrap_err();
        assert_eq!(
            err,
            LineErrorKind::TooFewTokens { line_type: 1, expected: 15, found: 8 }
        );
    }

    #[test]
    fn test_decode_bad_number() {
        let err = decode("3 16 0 0 0 1 zero 0 0 1 0").unwrap_err();
        assert_eq!(err, LineErrorKind::InvalidNumber("zero".to_string()));
        let err = decode("3 16 0 0 0 1 NaN 0 0 1 0").unwrap_err();
        assert_eq!(err, LineErrorKind::InvalidNumber("NaN".to_string()));
    }

    #[test]
    fn test_decode_bad_color() {
        let err = decode("3 red 0 0 0 1 0 0 0 1 0").unwrap_err();
        assert_eq!(err, LineErrorKind::InvalidColor("red".to_string()));
    }

    #[test]
    fn test_decode_unknown_type() {
        assert_eq!(decode("7 foo").unwrap_err(), LineErrorKind::UnknownLineType("7".into()));
    }

    #[test]
    fn test_decode_triangle_transformed() {
        let tokens: Vec<&str> = "3 4 0 0 0 1 0 0 0 1 0".split_whitespace().collect();
        let context = Mat4::from_scale(Vec3::splat(2.0));
        let Some(CommandRecord::Triangle { color, points }) = decode_line(&tokens, &context).unwrap() else {
            panic!("expected triangle");
        };
        assert_eq!(color, ColorCode::Palette(4));
        assert_eq!(points[1], Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(points[2], Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_decode_optional_line() {
        let record = decode("5 24 0 0 0 1 0 0 0 1 0 0 -1 0").unwrap().unwrap();
        let CommandRecord::OptionalLine { color, points, controls } = record else {
            panic!("expected optional line");
        };
        assert_eq!(color, ColorCode::Edge);
        assert_eq!(points[1], Vec3::X);
        assert_eq!(controls[1], Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_quad_order_convex() {
        let v = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(quad_order(&v), [0, 1, 2, 3]);
    }

    #[test]
    fn test_quad_order_bowtie() {
        // v2 and v3 swapped relative to the convex square.
        let v = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        assert_eq!(quad_order(&v), [0, 1, 3, 2]);
    }

    #[test]
    fn test_parse_quads_emit_corrected_indices() {
        let src = "\
4 16 0 0 0 1 0 0 1 1 0 0 1 0
4 16 0 0 0 1 0 0 0 1 0 1 1 0
";
        let part = PartParser::new("quads.dat", "quads.dat", src).parse();
        assert_eq!(part.mesh.faces[0].polygon, Polygon::Quad([0, 1, 2, 3]));
        assert_eq!(part.mesh.faces[1].polygon, Polygon::Quad([4, 5, 7, 6]));
        assert!(!part.had_errors());
    }

    #[test]
    fn test_parse_malformed_subfile_line() {
        let src = "\
0 Test part
3 16 0 0 0 1 0 0 0 1 0
1 16 0 0 0 1 0 0
";
        let part = PartParser::new("bad.dat", "bad.dat", src).parse();
        assert_eq!(part.mesh.faces.len(), 1);
        assert_eq!(part.mesh.triangle_count(), 1);
        assert!(part.subfiles.is_empty());
        assert!(part.had_errors());
        assert_eq!(part.errors[0].line, 3);
    }

    #[test]
    fn test_parse_trailing_tokens_flagged_but_kept() {
        let src = "1 4 0 0 0 1 0 0 0 1 0 0 0 1 brick.dat extra words\n";
        let part = PartParser::new("m.ldr", "m.ldr", src).parse();
        assert_eq!(part.subfiles.len(), 1);
        assert_eq!(part.subfiles[0].name, "brick.dat");
        assert_eq!(part.errors[0].kind, LineErrorKind::TrailingTokens(2));
    }

    #[test]
    fn test_parse_header_only_before_geometry() {
        let part = PartParser::new(
            "a.dat",
            "a.dat",
            "0 Brick\n0 Name: a.dat\n0 !LDRAW_ORG Part UPDATE 2020-01\n3 16 0 0 0 1 0 0 0 1 0\n",
        )
        .parse();
        assert!(part.is_part());

        let late = PartParser::new(
            "b.dat",
            "b.dat",
            "3 16 0 0 0 1 0 0 0 1 0\n0 !LDRAW_ORG Part\n",
        )
        .parse();
        assert!(!late.is_part());
    }

    #[test]
    fn test_parse_subpart_headers_mark_parts() {
        for header in [
            "0 !LDRAW_ORG Subpart UPDATE 2020-01",
            "0 !LDRAW_ORG Unofficial_Subpart",
            "0 !LDRAW_ORG Part_Alias",
        ] {
            let src = format!("{}\n3 16 0 0 0 1 0 0 0 1 0\n", header);
            let part = PartParser::new("s.dat", "s.dat", &src).parse();
            assert!(part.is_part(), "{}", header);
        }

        let prim = PartParser::new("p.dat", "p.dat", "0 !LDRAW_ORG Primitive\n").parse();
        assert!(!prim.is_part());
    }

    #[test]
    fn test_parse_lines_and_optional_lines() {
        let src = "2 24 0 0 0 1 0 0\n5 24 0 0 0 1 0 0 0 1 0 0 -1 0\n";
        let part = PartParser::new("edges.dat", "edges.dat", src).parse();
        assert_eq!(part.mesh.lines, vec![[0, 1]]);
        assert_eq!(part.optional_lines, 1);
        assert!(part.mesh.faces.is_empty());
        assert!(part.mesh.indices_valid());
    }
}
