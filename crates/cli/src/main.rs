use std::path::PathBuf;

use anyhow::Context;
use cad_builder_data::ProjectLayout;
use clap::Parser;

mod args;
mod data;
mod mesh;
mod prompts;

use args::{Args, Commands};

/// The project layout, rooted at `--root` or wherever a marker file is found above the current
/// directory.
pub(crate) fn layout(root: Option<PathBuf>) -> anyhow::Result<ProjectLayout> {
    match root {
        Some(root) => Ok(ProjectLayout::new(root)),
        None => {
            let cwd = std::env::current_dir().context("reading current directory")?;
            ProjectLayout::discover(&cwd).context("locating project root")
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Commands::Download(a) => data::download_command(args.root, a),
        Commands::Prompts(a) => prompts::prompts_command(args.root, a),
        Commands::Render(a) => mesh::render_command(a),
        Commands::RenderAll(a) => mesh::render_all_command(a),
        Commands::Convert(a) => mesh::convert_command(a),
        Commands::Inspect(a) => mesh::inspect_command(a),
        Commands::Dataset(a) => data::dataset_command(args.root, a),
    }
}
