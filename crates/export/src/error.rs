use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

/// The step of the render pipeline that was running when something failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reconstruct,
    Export,
    Reload,
    Convert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Reconstruct => "reconstruct",
            Stage::Export => "export",
            Stage::Reload => "reload",
            Stage::Convert => "convert",
        })
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot infer a mesh format from {}", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("invalid mesh: {0}")]
    Mesh(#[from] cad_builder_mesh::MeshError),

    #[error("invalid obj: {0}")]
    Obj(#[from] cad_builder_obj::ObjError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A reloaded file turned out to be a scene of several objects.
    #[error("{} holds {objects} objects, expected a single mesh", path.display())]
    NotASingleMesh { path: PathBuf, objects: usize },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        source: Box<ExportError>,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn at(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage that failed, when the error came out of the render pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
