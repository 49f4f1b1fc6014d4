use std::path::{Path, PathBuf};

use cad_builder_mesh::{reconstruct, FaceCoordinates, VertexIndex};
use log::{error, info, warn};

use crate::error::{ExportError, Result, Stage};
use crate::format::{export_mesh, load_mesh, MeshFormat};

/// Files produced for one rendered mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutputs {
    pub obj: PathBuf,
    pub stl: PathBuf,
    pub vertex_count: usize,
    pub face_count: usize,
}

/// Turns a free-text object description into a file stem. Every space becomes an underscore.
pub fn output_stem(description: &str) -> String {
    description.replace(' ', "_")
}

/// Reconstructs an indexed mesh from model output and writes it to `path`.
pub fn save_rendering<P: AsRef<Path>>(
    path: P,
    coords: &FaceCoordinates,
    vertices_per_face: usize,
) -> Result<VertexIndex> {
    let mesh = reconstruct(coords, vertices_per_face)
        .map_err(|e| ExportError::from(e).at(Stage::Reconstruct))?;
    info!("face coordinates shape: {:?}", coords.shape());
    info!("processed vertices shape: ({}, 3)", mesh.vertex_count());
    info!("processed faces shape: {:?}", mesh.face_shape());

    export_mesh(path, &mesh).map_err(|e| e.at(Stage::Export))?;
    Ok(mesh)
}

/// Reloads `src` and writes it again as `dst`, in the format of `dst`'s extension.
///
/// Reloading doubles as an integrity check: the file must load back as exactly one mesh.
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<VertexIndex> {
    let src = src.as_ref();
    let mesh = load_mesh(src)
        .and_then(|loaded| loaded.into_mesh(src))
        .map_err(|e| e.at(Stage::Reload))?;
    export_mesh(dst, &mesh).map_err(|e| e.at(Stage::Convert))?;
    Ok(mesh)
}

/// Runs the full pipeline for one mesh: `<dir>/<name>.obj` first, then `<dir>/<name>.stl`
/// converted from the reloaded OBJ.
///
/// Failures are logged with the stage that failed and returned. When the OBJ was written but
/// could not be turned into the STL, it is removed again.
pub fn render_to_files<P: AsRef<Path>>(
    coords: &FaceCoordinates,
    output_dir: P,
    name: &str,
    vertices_per_face: usize,
) -> Result<RenderOutputs> {
    let output_dir = output_dir.as_ref();
    let obj = output_dir.join(format!("{name}.{}", MeshFormat::Obj.extension()));
    let stl = output_dir.join(format!("{name}.{}", MeshFormat::Stl.extension()));

    let result = std::fs::create_dir_all(output_dir)
        .map_err(|e| ExportError::io(output_dir, e).at(Stage::Export))
        .and_then(|_| save_rendering(&obj, coords, vertices_per_face))
        .and_then(|_| convert(&obj, &stl));

    match result {
        Ok(mesh) => {
            info!("rendering saved as {}", stl.display());
            Ok(RenderOutputs {
                obj,
                stl,
                vertex_count: mesh.vertex_count(),
                face_count: mesh.face_count(),
            })
        }
        Err(e) => {
            error!("error while rendering {name}: {e}");
            if matches!(e.stage(), Some(Stage::Reload | Stage::Convert)) {
                if let Err(cleanup) = std::fs::remove_file(&obj) {
                    warn!("could not remove {}: {cleanup}", obj.display());
                }
            }
            Err(e)
        }
    }
}

/// Outcome of [`render_all`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<RenderOutputs>,
    pub failed: Vec<(PathBuf, ExportError)>,
}

/// Renders every `*.json` face-coordinate file in `input_dir` into `output_dir`.
///
/// Each file is independent: a file that fails to load or render is recorded and the batch moves
/// on. Only failing to list `input_dir` aborts the batch.
pub fn render_all<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    vertices_per_face: usize,
) -> Result<BatchReport> {
    let input_dir = input_dir.as_ref();
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .map_err(|e| ExportError::io(input_dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")))
        .collect();
    inputs.sort();

    let mut report = BatchReport::default();
    for input in inputs {
        let name = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = FaceCoordinates::read_json(&input)
            .map_err(|e| ExportError::from(e).at(Stage::Reconstruct))
            .and_then(|coords| render_to_files(&coords, output_dir.as_ref(), &name, vertices_per_face));
        match outcome {
            Ok(outputs) => report.rendered.push(outputs),
            Err(e) => {
                warn!("skipping {}: {e}", input.display());
                report.failed.push((input, e));
            }
        }
    }
    Ok(report)
}
