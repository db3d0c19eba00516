//! ASCII PLY reading and writing.
//!
//! The writer always emits the same fixed layout so that identical meshes produce
//! identical bytes:
//!
//! ```text
//! ply
//! format ascii 1.0
//! element vertex <N>
//! property float x
//! property float y
//! property float z
//! element face <M>
//! property list uchar int vertex_indices
//! end_header
//! <x> <y> <z>            (N lines)
//! 3 <i0> <i1> <i2>       (M lines)
//! ```
//!
//! The reader accepts any ASCII 1.0 file with a `vertex` element carrying `x`, `y`,
//! `z` properties and a `face` element carrying an index list property. Extra vertex
//! properties and unknown elements are skipped; polygons with more than three
//! corners are fan-triangulated.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use glam::Vec3;
use tracing::debug;

use crate::{Mesh, MeshError, Triangle};

#[derive(Debug)]
enum Property {
    Scalar(String),
    List(String),
}

#[derive(Debug)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

/// Parse an ASCII PLY stream into a [`Mesh`].
pub fn read_ply<R: BufRead>(reader: R) -> Result<Mesh, MeshError> {
    let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));
    let elements = read_header(&mut lines)?;

    let mut positions = Vec::new();
    let mut triangles: Vec<Triangle> = Vec::new();

    for element in &elements {
        if !matches!(element.name.as_str(), "vertex" | "face") {
            debug!("Skipping {} '{}' records", element.count, element.name);
        }
        let mut read = 0;
        while read < element.count {
            let Some((line_no, line)) = lines.next() else {
                return Err(MeshError::Truncated {
                    element: element.name.clone(),
                    expected: element.count,
                    actual: read,
                });
            };
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            match element.name.as_str() {
                "vertex" => positions.push(parse_vertex(element, &tokens, line_no)?),
                "face" => parse_face(element, &tokens, line_no, &mut triangles)?,
                _ => {}
            }
            read += 1;
        }
    }

    if positions.is_empty() || triangles.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    Mesh::new(positions, triangles)
}

/// Open and parse an ASCII PLY file.
pub fn read_ply_file(path: &Path) -> Result<Mesh, MeshError> {
    let file = File::open(path)?;
    read_ply(BufReader::new(file))
}

/// Serialize a mesh in the fixed ASCII PLY layout.
pub fn write_ply<W: Write>(mesh: &Mesh, mut writer: W) -> Result<(), MeshError> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", mesh.vertex_count())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "element face {}", mesh.triangle_count())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;
    for p in mesh.positions() {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "3 {a} {b} {c}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a mesh to `path`, replacing any existing file.
pub fn write_ply_file(mesh: &Mesh, path: &Path) -> Result<(), MeshError> {
    let file = File::create(path)?;
    write_ply(mesh, BufWriter::new(file))
}

fn read_header<I>(lines: &mut I) -> Result<Vec<Element>, MeshError>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let magic = next_line(lines)?;
    if magic.trim() != "ply" {
        return Err(MeshError::InvalidHeader("missing 'ply' magic".to_string()));
    }

    let mut elements: Vec<Element> = Vec::new();
    let mut saw_format = false;
    loop {
        let line = next_line(lines)?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] | ["comment", ..] | ["obj_info", ..] => {}
            ["format", "ascii", _] => saw_format = true,
            ["format", other, ..] => return Err(MeshError::UnsupportedFormat((*other).to_string())),
            ["element", name, count] => {
                let count = count.parse().map_err(|_| {
                    MeshError::InvalidHeader(format!("bad element count '{count}'"))
                })?;
                elements.push(Element {
                    name: (*name).to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            ["property", "list", _, _, name] => current(&mut elements)?
                .properties
                .push(Property::List((*name).to_string())),
            ["property", _, name] => current(&mut elements)?
                .properties
                .push(Property::Scalar((*name).to_string())),
            ["end_header"] => break,
            _ => return Err(MeshError::InvalidHeader(format!("unexpected line '{line}'"))),
        }
    }

    if !saw_format {
        return Err(MeshError::InvalidHeader("missing format line".to_string()));
    }
    Ok(elements)
}

fn next_line<I>(lines: &mut I) -> Result<String, MeshError>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    match lines.next() {
        Some((_, line)) => Ok(line?),
        None => Err(MeshError::InvalidHeader("unexpected end of header".to_string())),
    }
}

fn current(elements: &mut [Element]) -> Result<&mut Element, MeshError> {
    elements
        .last_mut()
        .ok_or_else(|| MeshError::InvalidHeader("property before any element".to_string()))
}

fn parse_vertex(element: &Element, tokens: &[&str], line: usize) -> Result<Vec3, MeshError> {
    let mut xyz = [None; 3];
    let mut cursor = 0;
    for property in &element.properties {
        match property {
            Property::Scalar(name) => {
                let token = scalar_token(tokens, cursor, name, line)?;
                let slot = match name.as_str() {
                    "x" => Some(0),
                    "y" => Some(1),
                    "z" => Some(2),
                    _ => None,
                };
                if let Some(slot) = slot {
                    xyz[slot] = Some(parse_token::<f32>(token, line)?);
                }
                cursor += 1;
            }
            Property::List(name) => {
                cursor += 1 + list_tokens(tokens, cursor, name, line)?.len();
            }
        }
    }
    match xyz {
        [Some(x), Some(y), Some(z)] => Ok(Vec3::new(x, y, z)),
        _ => Err(MeshError::Parse {
            line,
            reason: "vertex is missing an x, y or z property".to_string(),
        }),
    }
}

/// Fan-triangulate the face's index list.
///
/// The index list is the `vertex_indices` (or `vertex_index`) list property, or the
/// first list when neither name is present. Other properties are skipped.
fn parse_face(
    element: &Element,
    tokens: &[&str],
    line: usize,
    triangles: &mut Vec<Triangle>,
) -> Result<(), MeshError> {
    let index_list = element
        .properties
        .iter()
        .position(|p| matches!(p, Property::List(n) if n == "vertex_indices" || n == "vertex_index"))
        .or_else(|| element.properties.iter().position(|p| matches!(p, Property::List(_))))
        .ok_or_else(|| MeshError::Parse {
            line,
            reason: "face element has no list property".to_string(),
        })?;

    let mut cursor = 0;
    let mut corners = &[][..];
    for (i, property) in element.properties.iter().enumerate() {
        match property {
            Property::Scalar(name) => {
                scalar_token(tokens, cursor, name, line)?;
                cursor += 1;
            }
            Property::List(name) => {
                let values = list_tokens(tokens, cursor, name, line)?;
                if i == index_list {
                    corners = values;
                }
                cursor += 1 + values.len();
            }
        }
    }

    if corners.len() < 3 {
        return Err(MeshError::Parse {
            line,
            reason: format!("face has only {} indices", corners.len()),
        });
    }
    let indices = corners
        .iter()
        .map(|t| parse_token::<u32>(t, line))
        .collect::<Result<Vec<_>, _>>()?;
    for i in 1..indices.len() - 1 {
        triangles.push([indices[0], indices[i], indices[i + 1]]);
    }
    Ok(())
}

fn scalar_token<'a>(tokens: &[&'a str], cursor: usize, name: &str, line: usize) -> Result<&'a str, MeshError> {
    tokens.get(cursor).copied().ok_or_else(|| MeshError::Parse {
        line,
        reason: format!("missing value for property '{name}'"),
    })
}

/// The values of the list property starting at `cursor`, after its length token.
fn list_tokens<'t, 'a>(
    tokens: &'t [&'a str],
    cursor: usize,
    name: &str,
    line: usize,
) -> Result<&'t [&'a str], MeshError> {
    let len: usize = parse_token(scalar_token(tokens, cursor, name, line)?, line)?;
    let available = tokens.len() - cursor - 1;
    if len > available {
        return Err(MeshError::Parse {
            line,
            reason: format!("list '{name}' declares {len} values but has {available}"),
        });
    }
    Ok(&tokens[cursor + 1..cursor + 1 + len])
}

fn parse_token<T: std::str::FromStr>(token: &str, line: usize) -> Result<T, MeshError> {
    token.parse().map_err(|_| MeshError::Parse {
        line,
        reason: format!("cannot parse '{token}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "ply
format ascii 1.0
comment exported by a scanner
element vertex 4
property float x
property float y
property float z
property float confidence
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0.5
1 0 0 0.5
1 1 0 0.5
0 1 0 0.5
4 0 1 2 3
";

    fn single_triangle() -> Mesh {
        Mesh::from_flat(&[0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 0.0, 2.25, -1.0], &[0, 1, 2]).unwrap()
    }

    /// Extra vertex properties are skipped and quads are fan-triangulated.
    #[test]
    fn test_read_skips_extra_properties_and_triangulates() {
        let mesh = read_ply(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.positions()[2], Vec3::new(1.0, 1.0, 0.0));
    }

    /// The writer emits exactly the documented layout.
    #[test]
    fn test_write_layout() {
        let mut out = Vec::new();
        write_ply(&single_triangle(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1.5 0 0
0 2.25 -1
3 0 1 2
";
        assert_eq!(text, expected);
    }

    /// A file written by `write_ply` reads back to the same mesh.
    #[test]
    fn test_written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.ply");
        let mesh = single_triangle();
        write_ply_file(&mesh, &path).unwrap();
        assert_eq!(read_ply_file(&path).unwrap(), mesh);
    }

    #[test]
    fn test_binary_format_is_unsupported() {
        let src = "ply\nformat binary_little_endian 1.0\nend_header\n";
        assert!(matches!(
            read_ply(src.as_bytes()).unwrap_err(),
            MeshError::UnsupportedFormat(f) if f == "binary_little_endian"
        ));
    }

    #[test]
    fn test_missing_magic_is_invalid() {
        assert!(matches!(
            read_ply("format ascii 1.0\n".as_bytes()).unwrap_err(),
            MeshError::InvalidHeader(_)
        ));
    }

    #[test]
    fn test_truncated_body_is_reported() {
        let src = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
";
        match read_ply(src.as_bytes()).unwrap_err() {
            MeshError::Truncated {
                element,
                expected,
                actual,
            } => {
                assert_eq!(element, "vertex");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_number_reports_line() {
        let src = QUAD.replace("1 1 0 0.5", "1 one 0 0.5");
        match read_ply(src.as_bytes()).unwrap_err() {
            MeshError::Parse { line, .. } => assert_eq!(line, 14),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_file_is_empty_mesh() {
        let src = "ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\nend_header\n";
        assert!(matches!(
            read_ply(src.as_bytes()).unwrap_err(),
            MeshError::EmptyMesh
        ));
    }

    const HEADER: &str = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
";

    /// A face count larger than the line must fail, not panic.
    #[test]
    fn test_oversized_face_count_is_parse_error() {
        for count in ["18446744073709551615", "4"] {
            let src = format!("{HEADER}{count} 0 1 2\n");
            match read_ply(src.as_bytes()).unwrap_err() {
                MeshError::Parse { line, .. } => assert_eq!(line, 13),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    /// Same for a list property on a vertex.
    #[test]
    fn test_oversized_vertex_list_is_parse_error() {
        let src = "ply
format ascii 1.0
element vertex 1
property float x
property float y
property float z
property list uchar float extra
end_header
0 0 0 18446744073709551615 1.0
";
        assert!(matches!(
            read_ply(src.as_bytes()).unwrap_err(),
            MeshError::Parse { line: 9, .. }
        ));
    }

    /// Scalar face properties before the index list are skipped.
    #[test]
    fn test_face_scalar_before_index_list() {
        let src = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 2
property uchar material
property list uchar int vertex_indices
property list uchar float texcoord
end_header
0 0 0
1 0 0
1 1 0
0 1 0
7 3 0 1 2 6 0 0 1 0 1 1
2 3 0 2 3 0
";
        let mesh = read_ply(src.as_bytes()).unwrap();
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
    }

    /// Unknown elements between vertices and faces are consumed and ignored.
    #[test]
    fn test_unknown_element_is_skipped() {
        let src = HEADER.replace(
            "element face 1",
            "element edge 1\nproperty int vertex1\nproperty int vertex2\nelement face 1",
        );
        let src = format!("{src}0 1\n3 0 1 2\n");
        let mesh = read_ply(src.as_bytes()).unwrap();
        assert_eq!(mesh.triangles(), &[[0, 1, 2]]);
    }
}
