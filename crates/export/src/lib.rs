//! Export of reconstructed meshes, and the two stage render pipeline that turns raw model
//! output into an OBJ and an STL file.

mod error;
mod format;
mod render;

pub use error::{ExportError, Result, Stage};
pub use format::{export_mesh, load_mesh, LoadedMesh, MeshFormat};
pub use render::{convert, output_stem, render_all, render_to_files, save_rendering, BatchReport, RenderOutputs};
