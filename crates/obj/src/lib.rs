//! Wavefront OBJ support for indexed meshes.
//!
//! Only geometry is kept: `v` positions and `f` faces, grouped by `o`/`g` statements. Texture
//! coordinates, normals, materials and smoothing groups are accepted and ignored.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use cad_builder_mesh::{Vector3, VertexIndex};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ObjError>;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Mesh(#[from] cad_builder_mesh::MeshError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn parse_error(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}

/// A named group of faces.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjObject {
    pub name: String,
    pub mesh: VertexIndex,
}

/// Everything a file declares, one entry per object that has faces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjDocument {
    pub objects: Vec<ObjObject>,
}

impl ObjDocument {
    /// Returns the mesh when the file holds exactly one object.
    pub fn into_single(mut self) -> std::result::Result<VertexIndex, Self> {
        if self.objects.len() == 1 {
            if let Some(object) = self.objects.pop() {
                return Ok(object.mesh);
            }
        }
        Err(self)
    }
}

/// Writes `mesh` as OBJ text. Indices are 1-based on disk.
pub fn write_obj<W: Write>(w: &mut W, mesh: &VertexIndex) -> std::io::Result<()> {
    for p in mesh.points() {
        writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for face in mesh.faces() {
        write!(w, "f")?;
        for i in face {
            write!(w, " {}", i + 1)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn to_obj(mesh: &VertexIndex) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_obj(&mut out, mesh);
    String::from_utf8_lossy(&out).into_owned()
}

pub fn save_obj<P: AsRef<Path>>(p: P, mesh: &VertexIndex) -> std::io::Result<()> {
    let mut f = std::io::BufWriter::new(std::fs::File::create(p)?);
    write_obj(&mut f, mesh)?;
    f.flush()
}

/// Resolves one `f` element (`7`, `7/1`, `7//3`, `-1`) to a 0-based position index.
fn resolve_index(token: &str, vertex_count: usize, line: usize) -> Result<usize> {
    let position = token.split('/').next().unwrap_or(token);
    let raw: i64 = position
        .parse()
        .map_err(|_| parse_error(line, format!("bad face index {token:?}")))?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(vertex_count as i64 + r),
    };
    match resolved {
        Some(i) if (0..vertex_count as i64).contains(&i) => Ok(i as usize),
        _ => Err(parse_error(
            line,
            format!("face index {raw} outside {vertex_count} vertices"),
        )),
    }
}

struct PendingObject {
    name: String,
    triangles: Vec<[usize; 3]>,
}

impl PendingObject {
    fn named(name: String) -> Self {
        Self {
            name,
            triangles: Vec::new(),
        }
    }

    /// Keeps only the positions this object references, in file order.
    fn finish(self, positions: &[Vector3]) -> Result<ObjObject> {
        let mut remap = BTreeMap::new();
        for &i in self.triangles.iter().flatten() {
            remap.insert(i, 0u32);
        }
        let mut points = Vec::with_capacity(remap.len());
        for (local, (global, slot)) in remap.iter_mut().enumerate() {
            *slot = local as u32;
            points.push(positions[*global]);
        }
        let indices = self
            .triangles
            .iter()
            .flatten()
            .map(|global| remap.get(global).copied().unwrap_or_default())
            .collect();
        Ok(ObjObject {
            name: self.name,
            mesh: VertexIndex::new(points, indices, 3)?,
        })
    }
}

/// Parses OBJ text. Polygons are split into a fan of triangles around their first corner.
pub fn parse_obj(text: &str) -> Result<ObjDocument> {
    let mut positions: Vec<Vector3> = Vec::new();
    let mut finished: Vec<PendingObject> = Vec::new();
    let mut current = PendingObject::named(String::new());

    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        let line = line.split('#').next().unwrap_or_default();
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords = tokens
                    .take(3)
                    .map(str::parse::<f32>)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| parse_error(line_no, e.to_string()))?;
                if coords.len() != 3 {
                    return Err(parse_error(line_no, "vertex needs 3 coordinates"));
                }
                positions.push(Vector3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| resolve_index(t, positions.len(), line_no))
                    .collect::<Result<Vec<_>>>()?;
                if corners.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least 3 corners"));
                }
                for i in 1..corners.len() - 1 {
                    current.triangles.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            Some("o" | "g") => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                let previous = std::mem::replace(&mut current, PendingObject::named(name));
                finished.push(previous);
            }
            _ => (),
        }
    }
    finished.push(current);

    let objects = finished
        .into_iter()
        .filter(|o| !o.triangles.is_empty())
        .map(|o| o.finish(&positions))
        .collect::<Result<Vec<_>>>()?;
    log::debug!("parsed obj with {} objects", objects.len());
    Ok(ObjDocument { objects })
}

pub fn read_obj<P: AsRef<Path>>(p: P) -> Result<ObjDocument> {
    parse_obj(&std::fs::read_to_string(p)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> VertexIndex {
        VertexIndex::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            3,
        )
        .unwrap()
    }

    #[test]
    fn obj_lists_points_then_faces() {
        let obj = to_obj(&square());
        assert!(obj.starts_with("v 0 0 0\n"));
        assert!(obj.contains("v 1 1 0\n"));
        assert!(obj.ends_with("f 1 2 3\nf 1 3 4\n"));
    }

    #[test]
    fn parse_written_obj_as_single_object() {
        let doc = parse_obj(&to_obj(&square())).unwrap();
        assert_eq!(square(), doc.into_single().unwrap());
    }

    #[test]
    fn parse_slashed_and_negative_indices() {
        let doc = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2/5/1 -1\n").unwrap();
        let mesh = doc.into_single().unwrap();
        assert_eq!(vec![0, 1, 2], mesh.indices());
    }

    #[test]
    fn quads_become_two_triangles() {
        let doc = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(2, doc.into_single().unwrap().face_count());
    }

    #[test]
    fn groups_make_a_scene() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\no a\nf 1 2 3\no b\nf 1 2 4\n";
        let doc = parse_obj(text).unwrap();
        assert_eq!(vec!["a", "b"], doc.objects.iter().map(|o| o.name.as_str()).collect::<Vec<_>>());
        assert!(doc.into_single().is_err());
    }

    #[test]
    fn empty_groups_are_dropped() {
        let doc = parse_obj("o empty\nv 0 0 0\nv 1 0 0\nv 0 1 0\ng solid\nf 1 2 3\n").unwrap();
        assert_eq!(1, doc.objects.len());
        assert_eq!("solid", doc.objects[0].name);
    }

    #[test]
    fn out_of_range_face_is_rejected() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 2, .. }));
    }
}
