use byteorder::{LittleEndian, ReadBytesExt};
use cad_builder_mesh::{Triangle, TriangleMesh, Vector3};
use std::io::{Cursor, Read};
use std::path::Path;

mod write;

pub use write::*;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// One `solid ... endsolid` block. Binary files always hold exactly one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StlSolid {
    pub name: String,
    pub triangles: Vec<Triangle>,
}

fn invalid_data(msg: impl Into<String>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.into())
}

fn read_point<T: Read>(f: &mut T) -> std::io::Result<Vector3> {
    Ok(Vector3 {
        x: f.read_f32::<LittleEndian>()?,
        y: f.read_f32::<LittleEndian>()?,
        z: f.read_f32::<LittleEndian>()?,
    })
}

fn read_binary<T: Read>(f: &mut T) -> std::io::Result<StlSolid> {
    // Binary files start with an 80 byte header. There is no defined structure for this
    // header; we keep whatever printable text it holds as the solid name.
    let mut header = [0u8; HEADER_LEN];
    f.read_exact(&mut header)?;
    let name = String::from_utf8_lossy(&header)
        .trim_end_matches('\0')
        .trim()
        .to_string();

    // Immediately following the header is an unsigned 32-bit integer that indicates the
    // number of triangles that follow.
    let n_triangles = f.read_u32::<LittleEndian>()? as usize;

    let mut triangles = Vec::<Triangle>::with_capacity(n_triangles.min(1 << 20));
    for _ in 0..n_triangles {
        // The stored normal is recomputed from the winding when needed, so it is skipped.
        let _normal = read_point(f)?;
        triangles.push(Triangle {
            p0: read_point(f)?,
            p1: read_point(f)?,
            p2: read_point(f)?,
        });
        // After the triangle geometry there is a 2-byte "attribute byte count" with no
        // standard meaning.
        let _attribute_byte_count = f.read_u16::<LittleEndian>()?;
    }
    Ok(StlSolid { name, triangles })
}

fn parse_coords<'a>(mut tokens: impl Iterator<Item = &'a str>, line: usize) -> std::io::Result<Vector3> {
    let mut next = || -> std::io::Result<f32> {
        tokens
            .next()
            .ok_or_else(|| invalid_data(format!("line {line}: vertex needs 3 coordinates")))?
            .parse::<f32>()
            .map_err(|e| invalid_data(format!("line {line}: {e}")))
    };
    Ok(Vector3::new(next()?, next()?, next()?))
}

fn read_ascii(text: &str) -> std::io::Result<Vec<StlSolid>> {
    let mut solids = Vec::new();
    let mut current: Option<StlSolid> = None;
    let mut facet: Vec<Vector3> = Vec::with_capacity(3);

    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("solid") => {
                if current.is_some() {
                    return Err(invalid_data(format!("line {line_no}: nested solid")));
                }
                current = Some(StlSolid {
                    name: tokens.collect::<Vec<_>>().join(" "),
                    triangles: Vec::new(),
                });
            }
            Some("endsolid") => match current.take() {
                Some(solid) => solids.push(solid),
                None => return Err(invalid_data(format!("line {line_no}: endsolid without solid"))),
            },
            Some("vertex") => facet.push(parse_coords(tokens, line_no)?),
            Some("endloop") => {
                let solid = current
                    .as_mut()
                    .ok_or_else(|| invalid_data(format!("line {line_no}: facet outside solid")))?;
                if facet.len() != 3 {
                    return Err(invalid_data(format!(
                        "line {line_no}: facet has {} vertices, expected 3",
                        facet.len()
                    )));
                }
                solid.triangles.push(Triangle {
                    p0: facet[0],
                    p1: facet[1],
                    p2: facet[2],
                });
                facet.clear();
            }
            Some("facet" | "outer" | "endfacet") | None => (),
            Some(other) => {
                return Err(invalid_data(format!("line {line_no}: unexpected keyword {other:?}")))
            }
        }
    }

    if let Some(solid) = current {
        // Some exporters forget the trailing endsolid; accept what was read.
        log::warn!("ascii stl ended inside solid {:?}", solid.name);
        solids.push(solid);
    }
    Ok(solids)
}

/// Decides between the two encodings.
///
/// ASCII files begin with `solid`, but so do plenty of binary headers. A file whose size matches
/// the facet count in its header exactly is treated as binary regardless.
fn is_ascii(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    if !data[start..].starts_with(b"solid") {
        return false;
    }
    if data.len() >= HEADER_LEN + 4 {
        let count = u32::from_le_bytes([
            data[HEADER_LEN],
            data[HEADER_LEN + 1],
            data[HEADER_LEN + 2],
            data[HEADER_LEN + 3],
        ]) as usize;
        if data.len() == HEADER_LEN + 4 + count * FACET_LEN {
            return false;
        }
    }
    true
}

/// Parses every solid in an STL buffer.
pub fn parse_stl_solids(data: &[u8]) -> std::io::Result<Vec<StlSolid>> {
    if is_ascii(data) {
        let text = std::str::from_utf8(data).map_err(|e| invalid_data(e.to_string()))?;
        read_ascii(text)
    } else {
        Ok(vec![read_binary(&mut Cursor::new(data))?])
    }
}

pub fn read_stl_solids<P: AsRef<Path>>(p: P) -> std::io::Result<Vec<StlSolid>> {
    parse_stl_solids(&std::fs::read(p)?)
}

/// Parses an STL buffer into a single mesh, merging all solids.
pub fn parse_stl<M: TriangleMesh>(data: &[u8]) -> std::io::Result<M> {
    let triangles = parse_stl_solids(data)?
        .into_iter()
        .flat_map(|solid| solid.triangles)
        .collect();
    Ok(M::from_triangles(triangles))
}

pub fn read_stl<M: TriangleMesh, P: AsRef<Path>>(p: P) -> std::io::Result<M> {
    parse_stl(&std::fs::read(p)?)
}

pub trait StlReader: Read {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M>;
}

impl<T: Read> StlReader for T {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M> {
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        parse_stl(&data)
    }
}
