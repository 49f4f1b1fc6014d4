use std::io::{BufWriter, Write};
use std::path::Path;

use cad_builder_mesh::{TriangleMesh, VertexIndex};
use cad_builder_obj::{read_obj, write_obj};
use cad_builder_stl::{read_stl_solids, write_stl, StlEncoding};
use log::info;
use tempfile::NamedTempFile;

use crate::error::{ExportError, Result};

/// Mesh file formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Wavefront OBJ, indexed text.
    Obj,
    /// Stereolithography, unindexed facets. Written as binary.
    Stl,
}

impl MeshFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            _ => None,
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Stl => "stl",
        }
    }
}

fn format_of(path: &Path) -> Result<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| ExportError::UnknownFormat {
        path: path.to_path_buf(),
    })
}

/// What loading a mesh file produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedMesh {
    Mesh(VertexIndex),
    /// Several named objects. Files without any faces also land here, with no objects.
    Scene(Vec<(String, VertexIndex)>),
}

impl LoadedMesh {
    /// Unwraps a single mesh, reporting a scene as an error against `path`.
    pub fn into_mesh<P: AsRef<Path>>(self, path: P) -> Result<VertexIndex> {
        match self {
            LoadedMesh::Mesh(mesh) => Ok(mesh),
            LoadedMesh::Scene(objects) => Err(ExportError::NotASingleMesh {
                path: path.as_ref().to_path_buf(),
                objects: objects.len(),
            }),
        }
    }
}

/// Writes `mesh` to `path` in the format its extension names.
///
/// Face indices are checked before anything touches the disk. The file is written next to its
/// destination and moved into place once complete, so a failed export never leaves a partial
/// file behind.
pub fn export_mesh<P: AsRef<Path>>(path: P, mesh: &VertexIndex) -> Result<()> {
    let path = path.as_ref();
    let format = format_of(path)?;
    mesh.validate()?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ExportError::io(path, e))?;
    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        let written = match format {
            MeshFormat::Obj => write_obj(&mut w, mesh),
            MeshFormat::Stl => {
                let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("mesh");
                write_stl(&mut w, mesh, name, StlEncoding::Binary)
            }
        };
        written
            .and_then(|_| w.flush())
            .map_err(|e| ExportError::io(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| ExportError::io(path, e.error))?;

    info!(
        "saved {} vertices, {} faces to {}",
        mesh.vertex_count(),
        mesh.face_count(),
        path.display()
    );
    Ok(())
}

/// Loads a mesh file, inferring the format from its extension.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<LoadedMesh> {
    let path = path.as_ref();
    let loaded = match format_of(path)? {
        MeshFormat::Obj => {
            let doc = read_obj(path)?;
            match doc.into_single() {
                Ok(mesh) => LoadedMesh::Mesh(mesh),
                Err(doc) => LoadedMesh::Scene(
                    doc.objects.into_iter().map(|o| (o.name, o.mesh)).collect(),
                ),
            }
        }
        MeshFormat::Stl => {
            let mut solids = read_stl_solids(path).map_err(|e| ExportError::io(path, e))?;
            if solids.len() == 1 {
                let solid = solids.remove(0);
                LoadedMesh::Mesh(VertexIndex::from_triangles(solid.triangles))
            } else {
                LoadedMesh::Scene(
                    solids
                        .into_iter()
                        .map(|s| (s.name, VertexIndex::from_triangles(s.triangles)))
                        .collect(),
                )
            }
        }
    };
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(Some(MeshFormat::Obj), MeshFormat::from_path("out/chair.obj"));
        assert_eq!(Some(MeshFormat::Stl), MeshFormat::from_path("chair.STL"));
        assert_eq!(None, MeshFormat::from_path("chair.ply"));
        assert_eq!(None, MeshFormat::from_path("chair"));
    }

    #[test]
    fn unknown_extension_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.ply");
        let mesh = VertexIndex::from_triangles(Vec::new());
        assert!(matches!(
            export_mesh(&path, &mesh),
            Err(ExportError::UnknownFormat { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn scene_does_not_unwrap_to_a_mesh() {
        let err = LoadedMesh::Scene(Vec::new()).into_mesh("scene.obj").unwrap_err();
        assert_eq!("scene.obj holds 0 objects, expected a single mesh", err.to_string());
    }
}
