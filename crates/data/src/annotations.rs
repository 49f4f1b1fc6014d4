use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Seed for every sampled subset, so reruns pick the same meshes.
pub const SAMPLE_SEED: u64 = 42;

/// One row of the upstream annotation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub file_identifier: String,
    pub file_type: String,
    pub source: String,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl Annotation {
    pub fn is_github_stl(&self) -> bool {
        self.file_type == "stl" && self.source == "github"
    }
}

pub fn read_annotations<P: AsRef<Path>>(path: P) -> Result<Vec<Annotation>> {
    let path = path.as_ref();
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    csv::Reader::from_path(path)
        .map_err(csv_err)?
        .deserialize()
        .collect::<std::result::Result<Vec<Annotation>, _>>()
        .map_err(csv_err)
}

/// Picks `count` GitHub-hosted STL annotations, shuffled with `seed`.
pub fn select_github_stl(annotations: &[Annotation], count: usize, seed: u64) -> Result<Vec<Annotation>> {
    let mut candidates: Vec<&Annotation> = annotations.iter().filter(|a| a.is_github_stl()).collect();
    if count > candidates.len() {
        return Err(DataError::NotEnoughAnnotations {
            requested: count,
            available: candidates.len(),
        });
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    candidates.shuffle(&mut rng);
    Ok(candidates.into_iter().take(count).cloned().collect())
}

/// Maps a GitHub file page to the raw file behind it.
///
/// `https://github.com/o/r/blob/main/a.stl` becomes `https://raw.github.com/o/r/main/a.stl`.
/// Identifiers that are not `https://` URLs have no raw form.
pub fn raw_download_url(identifier: &str) -> Option<String> {
    if !identifier.starts_with("https://") {
        return None;
    }
    Some(
        identifier
            .replace("/blob/", "/")
            .replace("https://", "https://raw."),
    )
}
