use byteorder::{LittleEndian, WriteBytesExt};
use cad_builder_mesh::{Triangle, TriangleMesh, Vector3};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlEncoding {
    #[default]
    Binary,
    Ascii,
}

fn write_point<W: Write>(w: &mut W, p: Vector3) -> std::io::Result<()> {
    w.write_f32::<LittleEndian>(p.x)?;
    w.write_f32::<LittleEndian>(p.y)?;
    w.write_f32::<LittleEndian>(p.z)
}

fn write_binary<W: Write>(w: &mut W, triangles: &[Triangle], name: &str) -> std::io::Result<()> {
    let mut header = [0u8; 80];
    let name = name.as_bytes();
    // Never let the header start with "solid", readers would take the file for ASCII.
    let name = if name.starts_with(b"solid") { &name[5..] } else { name };
    let len = name.len().min(header.len());
    header[..len].copy_from_slice(&name[..len]);
    w.write_all(&header)?;

    let count = u32::try_from(triangles.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} triangles do not fit a binary stl", triangles.len()),
        )
    })?;
    w.write_u32::<LittleEndian>(count)?;

    for t in triangles {
        write_point(w, t.normal())?;
        write_point(w, t.p0)?;
        write_point(w, t.p1)?;
        write_point(w, t.p2)?;
        w.write_u16::<LittleEndian>(0)?;
    }
    Ok(())
}

fn write_ascii<W: Write>(w: &mut W, triangles: &[Triangle], name: &str) -> std::io::Result<()> {
    writeln!(w, "solid {name}")?;
    for t in triangles {
        let n = t.normal();
        writeln!(w, "  facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(w, "    outer loop")?;
        for p in [t.p0, t.p1, t.p2] {
            writeln!(w, "      vertex {} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(w, "    endloop")?;
        writeln!(w, "  endfacet")?;
    }
    writeln!(w, "endsolid {name}")
}

/// Writes `mesh` as STL, one facet per triangle, with normals computed from the winding.
pub fn write_stl<M: TriangleMesh, W: Write>(
    w: &mut W,
    mesh: &M,
    name: &str,
    encoding: StlEncoding,
) -> std::io::Result<()> {
    let triangles: Vec<Triangle> = mesh.triangles().collect();
    match encoding {
        StlEncoding::Binary => write_binary(w, &triangles, name),
        StlEncoding::Ascii => write_ascii(w, &triangles, name),
    }
}

pub fn to_stl_bytes<M: TriangleMesh>(
    mesh: &M,
    name: &str,
    encoding: StlEncoding,
) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_stl(&mut out, mesh, name, encoding)?;
    Ok(out)
}

pub fn save_stl<M: TriangleMesh, P: AsRef<Path>>(
    p: P,
    mesh: &M,
    encoding: StlEncoding,
) -> std::io::Result<()> {
    let p = p.as_ref();
    let name = p.file_stem().and_then(|s| s.to_str()).unwrap_or("mesh");
    let mut f = std::io::BufWriter::new(std::fs::File::create(p)?);
    write_stl(&mut f, mesh, name, encoding)?;
    f.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_builder_mesh::VertexIndex;

    fn triangle() -> VertexIndex {
        VertexIndex::from_triangles(vec![Triangle {
            p0: Vector3::new(0.0, 0.0, 0.0),
            p1: Vector3::new(1.0, 0.0, 0.0),
            p2: Vector3::new(0.0, 1.0, 0.0),
        }])
    }

    #[test]
    fn binary_size_and_count() {
        let bytes = to_stl_bytes(&triangle(), "test", StlEncoding::Binary).unwrap();
        assert_eq!(84 + 50, bytes.len());
        assert_eq!(1, u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]));
    }

    #[test]
    fn binary_header_never_reads_as_ascii() {
        let bytes = to_stl_bytes(&triangle(), "solid-name", StlEncoding::Binary).unwrap();
        assert!(!bytes.starts_with(b"solid"));
    }

    #[test]
    fn ascii_has_facet_structure() {
        let text = String::from_utf8(to_stl_bytes(&triangle(), "tri", StlEncoding::Ascii).unwrap()).unwrap();
        assert!(text.starts_with("solid tri\n"));
        assert!(text.contains("facet normal 0 0 1"));
        assert!(text.contains("vertex 1 0 0"));
        assert!(text.ends_with("endsolid tri\n"));
    }
}
