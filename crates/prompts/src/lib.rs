//! Prompt generation: show rendered views of an object to a vision-language model and keep the
//! beginner and intermediate prompts it suggests.

mod backend;
mod error;
mod images;
mod parse;
mod record;
mod templates;

pub use backend::{
    BackendConfig, HostedBackend, LocalBackend, PromptBackend, DEFAULT_HOSTED_ENDPOINT, DEFAULT_HOSTED_MODEL,
    DEFAULT_LOCAL_ENDPOINT, DEFAULT_LOCAL_MODEL, DEFAULT_MAX_TOKENS,
};
pub use error::{PromptError, Result};
pub use images::{collect_image_views, encode_data_uri, file_uri};
pub use parse::parse_prompt;
pub use record::{create_prompts_for_all_stl_files, generate_prompt_record, PromptRecord};
pub use templates::{PromptTemplates, BEGINNER_KEY, INTERMEDIATE_KEY};
