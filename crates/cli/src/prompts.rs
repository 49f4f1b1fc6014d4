use std::path::PathBuf;

use anyhow::Context;
use cad_builder_prompts::{create_prompts_for_all_stl_files, BackendConfig, PromptTemplates};
use log::info;

use crate::args::{BackendKind, PromptsArgs};
use crate::layout;

fn backend_config(args: &PromptsArgs) -> BackendConfig {
    let mut config = match args.backend {
        BackendKind::Hosted => BackendConfig::hosted(args.api_key.clone()),
        BackendKind::Local => BackendConfig::local(),
    };
    match &mut config {
        BackendConfig::Hosted { endpoint, model, .. } => {
            override_with(endpoint, &args.endpoint);
            override_with(model, &args.model);
        }
        BackendConfig::Local {
            endpoint,
            model,
            max_tokens,
        } => {
            override_with(endpoint, &args.endpoint);
            override_with(model, &args.model);
            *max_tokens = args.max_tokens;
        }
    }
    config
}

fn override_with(value: &mut String, replacement: &Option<String>) {
    if let Some(replacement) = replacement {
        value.clone_from(replacement);
    }
}

pub fn prompts_command(root: Option<PathBuf>, args: PromptsArgs) -> anyhow::Result<()> {
    let layout = layout(root)?;
    let stl_dir = args.stl_dir.clone().unwrap_or_else(|| layout.raw_stl_dir());
    let backend = backend_config(&args).build()?;

    let templates = PromptTemplates::default();
    let written = create_prompts_for_all_stl_files(&stl_dir, &layout, backend.as_ref(), &templates)
        .with_context(|| format!("creating prompts for {}", stl_dir.display()))?;
    info!("wrote {} prompt files to {}", written.len(), layout.prompts_dir().display());
    Ok(())
}
