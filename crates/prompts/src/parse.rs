use crate::error::{PromptError, Result};

/// Pulls the prompt following `<key>: ` out of a model response.
///
/// The prompt runs up to the next occurrence of the same prefix, or the end of the response.
/// Its first and last characters, the quotes the model is asked to wrap it in, are dropped; a
/// prompt of fewer than two characters comes back empty. Only a missing prefix is an error.
pub fn parse_prompt(response: &str, key: &str) -> Result<String> {
    let marker = format!("{key}: ");
    let (_, rest) = response
        .split_once(&marker)
        .ok_or_else(|| PromptError::format(key, "prefix not found"))?;
    let body = rest.split(&marker).next().unwrap_or(rest);

    let mut chars = body.chars();
    chars.next();
    chars.next_back();
    Ok(chars.as_str().to_string())
}
