use anyhow::Context;
use cad_builder_export::{convert, load_mesh, output_stem, render_all, render_to_files, LoadedMesh};
use cad_builder_mesh::{FaceCoordinates, TriangleMesh, VertexIndex};
use log::{info, warn};

use crate::args::{ConvertArgs, InspectArgs, RenderAllArgs, RenderArgs};

pub fn render_command(args: RenderArgs) -> anyhow::Result<()> {
    let coords = FaceCoordinates::read_json(&args.input)
        .with_context(|| format!("reading face coordinates from {}", args.input.display()))?;
    let name = match &args.name {
        Some(name) => output_stem(name),
        None => args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("input has no file name")?,
    };
    let outputs = render_to_files(&coords, &args.output_dir, &name, args.vertices_per_face)?;
    println!(
        "{}: {} vertices, {} faces",
        outputs.stl.display(),
        outputs.vertex_count,
        outputs.face_count
    );
    Ok(())
}

pub fn render_all_command(args: RenderAllArgs) -> anyhow::Result<()> {
    let report = render_all(&args.input_dir, &args.output_dir, args.vertices_per_face)
        .with_context(|| format!("rendering {}", args.input_dir.display()))?;
    info!(
        "rendered {} meshes into {}",
        report.rendered.len(),
        args.output_dir.display()
    );
    if !report.failed.is_empty() {
        warn!("{} inputs failed", report.failed.len());
    }
    Ok(())
}

pub fn convert_command(args: ConvertArgs) -> anyhow::Result<()> {
    let mesh = convert(&args.src, &args.dst)?;
    info!(
        "converted {} to {} ({} vertices, {} faces)",
        args.src.display(),
        args.dst.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(())
}

fn describe(mesh: &VertexIndex) -> String {
    let (faces, vertices_per_face) = mesh.face_shape();
    format!(
        "{} vertices, {faces} faces of {vertices_per_face}, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )
}

pub fn inspect_command(args: InspectArgs) -> anyhow::Result<()> {
    match load_mesh(&args.path)? {
        LoadedMesh::Mesh(mesh) => println!("{}: {}", args.path.display(), describe(&mesh)),
        LoadedMesh::Scene(objects) => {
            println!("{}: scene of {} objects", args.path.display(), objects.len());
            for (name, mesh) in &objects {
                println!("  {name}: {}", describe(mesh));
            }
        }
    }
    Ok(())
}
