use std::path::PathBuf;

use anyhow::Context;
use cad_builder_data::{load_prepared, read_annotations, select_github_stl, Downloader};
use log::{info, warn};

use crate::args::{DatasetArgs, DownloadArgs};
use crate::layout;

pub fn download_command(root: Option<PathBuf>, args: DownloadArgs) -> anyhow::Result<()> {
    let layout = layout(root)?;
    let annotations_path = args
        .annotations
        .unwrap_or_else(|| layout.annotations_dir().join("annotations.csv"));
    let output = args.output.unwrap_or_else(|| layout.raw_stl_dir());

    let annotations = read_annotations(&annotations_path)
        .with_context(|| format!("reading annotations from {}", annotations_path.display()))?;
    let selected = select_github_stl(&annotations, args.count, args.seed)?;
    info!("selected {} of {} annotations", selected.len(), annotations.len());

    let report = Downloader::new()?.download_annotations(&selected, &output)?;
    info!(
        "saved {} files to {}, {} failed",
        report.saved.len(),
        output.display(),
        report.failed.len()
    );
    Ok(())
}

pub fn dataset_command(root: Option<PathBuf>, args: DatasetArgs) -> anyhow::Result<()> {
    let csv = match args.csv {
        Some(csv) => csv,
        None => layout(root)?.prepared_csv(),
    };
    let dataset = load_prepared(&csv).with_context(|| format!("loading {}", csv.display()))?;
    if dataset.is_empty() {
        warn!("{} has no usable rows", csv.display());
    }
    print!("{}", dataset.summary());
    for uid in dataset.sample_uids(args.sample, args.seed) {
        println!("{uid}");
    }
    Ok(())
}
