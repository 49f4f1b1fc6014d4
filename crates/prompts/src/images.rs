use std::path::{Path, PathBuf};

use base64::Engine;

use crate::error::{PromptError, Result};

/// The rendered `.png` views in `dir`, sorted by file name. Case of the extension is ignored.
pub fn collect_image_views(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut views = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| PromptError::io(dir, e))? {
        let path = entry.map_err(|e| PromptError::io(dir, e))?.path();
        let is_png = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            views.push(path);
        }
    }
    views.sort();
    Ok(views)
}

/// Inlines a png file as a `data:image/png;base64,...` URI.
pub fn encode_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| PromptError::io(path, e))?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

/// A `file://` reference to `path`, for backends that read images from the local disk.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}
