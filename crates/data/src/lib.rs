//! Project layout and dataset plumbing: finding the project root, picking and downloading raw
//! meshes, and loading the prepared text-to-CAD table.

mod annotations;
mod download;
mod error;
mod prepared;
mod root;

pub use annotations::{raw_download_url, read_annotations, select_github_stl, Annotation, SAMPLE_SEED};
pub use download::{file_name_from_url, DownloadFailure, DownloadReport, Downloader};
pub use error::{DataError, Result};
pub use prepared::{load_prepared, DatasetSummary, PreparedDataset, PreparedRecord};
pub use root::{find_marked_ancestor, find_project_root, ProjectLayout, MARKER_PREFIX};
