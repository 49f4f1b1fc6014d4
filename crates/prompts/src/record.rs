use std::path::{Path, PathBuf};

use cad_builder_data::ProjectLayout;
use log::info;
use serde::{Deserialize, Serialize};

use crate::backend::PromptBackend;
use crate::error::{PromptError, Result};
use crate::images::collect_image_views;
use crate::parse::parse_prompt;
use crate::templates::{PromptTemplates, BEGINNER_KEY, INTERMEDIATE_KEY};

/// The two prompts written for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub prompt_beginner: String,
    pub prompt_intermediate: String,
}

impl PromptRecord {
    /// Parses the raw beginner and intermediate responses of a backend.
    pub fn from_responses(beginner: &str, intermediate: &str) -> Result<Self> {
        Ok(Self {
            prompt_beginner: parse_prompt(beginner, BEGINNER_KEY)?,
            prompt_intermediate: parse_prompt(intermediate, INTERMEDIATE_KEY)?,
        })
    }

    /// The record as JSON indented with four spaces.
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits valid UTF-8.
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PromptError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| PromptError::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PromptError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Asks `backend` about the views in `image_dir` and parses both answers.
pub fn generate_prompt_record(
    backend: &dyn PromptBackend,
    image_dir: &Path,
    templates: &PromptTemplates,
) -> Result<PromptRecord> {
    let images = collect_image_views(image_dir)?;
    if images.is_empty() {
        return Err(PromptError::NoImages {
            dir: image_dir.to_path_buf(),
        });
    }
    let (beginner, intermediate) = backend.generate(&images, templates)?;
    PromptRecord::from_responses(&beginner, &intermediate)
}

/// Writes a prompt record for every `.stl` file in `stl_dir`, in file name order.
///
/// Views are read from the layout's image directory named after the file and the record goes
/// to `prompts/<file name>.json`. The first failure stops the batch.
pub fn create_prompts_for_all_stl_files(
    stl_dir: &Path,
    layout: &ProjectLayout,
    backend: &dyn PromptBackend,
    templates: &PromptTemplates,
) -> Result<Vec<PathBuf>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(stl_dir).map_err(|e| PromptError::io(stl_dir, e))? {
        let name = entry
            .map_err(|e| PromptError::io(stl_dir, e))?
            .file_name()
            .to_string_lossy()
            .into_owned();
        if name.ends_with(".stl") {
            names.push(name);
        }
    }
    names.sort();

    let mut written = Vec::with_capacity(names.len());
    for name in names {
        let record = generate_prompt_record(backend, &layout.images_dir(&name), templates)?;
        let path = layout.prompt_path(&name);
        record.save(&path)?;
        info!("wrote prompts for {name} to {}", path.display());
        written.push(path);
    }
    Ok(written)
}
