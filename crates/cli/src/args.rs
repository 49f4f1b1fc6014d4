use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Annotation table to sample from. Defaults to `raw/annotations/annotations.csv` under the
    /// data directory.
    #[arg(long)]
    pub annotations: Option<PathBuf>,

    /// Number of GitHub STL files to fetch.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    #[arg(long, default_value_t = cad_builder_data::SAMPLE_SEED)]
    pub seed: u64,

    /// Where to save the files. Defaults to `raw/stl` under the data directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Hosted,
    Local,
}

#[derive(clap::Args, Debug)]
pub struct PromptsArgs {
    /// Folder of STL files to write prompts for. Defaults to `raw/stl` under the data directory.
    pub stl_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = BackendKind::Hosted)]
    pub backend: BackendKind,

    /// Chat-completions URL. Each backend has its own default.
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Answer length limit for the local backend.
    #[arg(long, default_value_t = cad_builder_prompts::DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Face coordinates as JSON, shaped (1, faces, vertices per face, 3).
    pub input: PathBuf,

    /// Object description, used as the output file name.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = 3)]
    pub vertices_per_face: usize,
}

#[derive(clap::Args, Debug)]
pub struct RenderAllArgs {
    /// Folder of face coordinate JSON files.
    pub input_dir: PathBuf,

    #[arg(short, long)]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = 3)]
    pub vertices_per_face: usize,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    pub src: PathBuf,
    pub dst: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// An .obj or .stl file.
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct DatasetArgs {
    /// Prepared table. Defaults to `text2cad_v1.1.csv` under the data directory.
    pub csv: Option<PathBuf>,

    /// How many uids to sample.
    #[arg(short = 'n', long, default_value_t = 5)]
    pub sample: usize,

    #[arg(long, default_value_t = cad_builder_data::SAMPLE_SEED)]
    pub seed: u64,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Project root. Found by looking for a `.env*` file above the current directory otherwise.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch a sample of GitHub-hosted STL files listed in the annotations.
    Download(DownloadArgs),
    /// Write beginner and intermediate prompts for rendered STL files.
    Prompts(PromptsArgs),
    /// Turn one face coordinate file into OBJ and STL meshes.
    Render(RenderArgs),
    /// Render every face coordinate file in a folder.
    RenderAll(RenderAllArgs),
    /// Re-export a mesh file in the format of another extension.
    Convert(ConvertArgs),
    /// Print vertex and face counts of a mesh file.
    Inspect(InspectArgs),
    /// Summarize the prepared text-to-CAD table.
    Dataset(DatasetArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_are_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn render_all_is_kebab_case() {
        let args = Args::parse_from(["cad-builder", "render-all", "in", "-o", "out"]);
        match args.command {
            Commands::RenderAll(a) => {
                assert_eq!(PathBuf::from("in"), a.input_dir);
                assert_eq!(3, a.vertices_per_face);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn local_backend_is_selected_explicitly() {
        let args = Args::parse_from(["cad-builder", "--root", "/p", "prompts", "--backend", "local"]);
        assert_eq!(Some(PathBuf::from("/p")), args.root);
        match args.command {
            Commands::Prompts(a) => {
                assert_eq!(BackendKind::Local, a.backend);
                assert_eq!(200, a.max_tokens);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
