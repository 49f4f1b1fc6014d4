use std::path::PathBuf;

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{PromptError, Result};
use crate::images::{encode_data_uri, file_uri};
use crate::templates::PromptTemplates;

pub const DEFAULT_HOSTED_ENDPOINT: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_HOSTED_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Qwen-32B";
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://127.0.0.1:8000/v1/chat/completions";
pub const DEFAULT_LOCAL_MODEL: &str = "Qwen/Qwen2.5-VL-3B-Instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Something that looks at the views of an object and answers both templates.
///
/// Returns the raw beginner and intermediate responses, in that order.
pub trait PromptBackend {
    fn generate(&self, images: &[PathBuf], templates: &PromptTemplates) -> Result<(String, String)>;
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Image { image: String },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

fn build_client(endpoint: &str) -> Result<Client> {
    Client::builder().build().map_err(|source| PromptError::Http {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// A chat-completions endpoint. Each call sends one user message and returns the first choice.
struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
}

impl ChatClient {
    fn complete(&self, content: Vec<ContentPart<'_>>) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content,
            }],
            max_tokens: self.max_tokens,
        };
        debug!("POST {} ({})", self.endpoint, self.model);

        let http_err = |source| PromptError::Http {
            endpoint: self.endpoint.clone(),
            source,
        };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response: ChatResponse = builder
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(http_err)?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PromptError::EmptyResponse {
                endpoint: self.endpoint.clone(),
            })
    }

    /// Sends each template with the same image parts, beginner first.
    fn answer_templates<F>(&self, templates: &PromptTemplates, images: F) -> Result<(String, String)>
    where
        F: Fn() -> Vec<ContentPart<'static>>,
    {
        let ask = |text: &str| {
            let mut content: Vec<ContentPart<'_>> = images();
            content.push(ContentPart::Text { text });
            self.complete(content)
        };
        Ok((ask(&templates.beginner)?, ask(&templates.intermediate)?))
    }
}

/// A hosted inference API. Views travel inline as base64 data URIs.
pub struct HostedBackend {
    chat: ChatClient,
}

impl HostedBackend {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = build_client(&endpoint)?;
        Ok(Self::with_client(client, endpoint, model, api_key))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            chat: ChatClient {
                client,
                endpoint: endpoint.into(),
                model: model.into(),
                api_key,
                max_tokens: None,
            },
        }
    }
}

impl PromptBackend for HostedBackend {
    fn generate(&self, images: &[PathBuf], templates: &PromptTemplates) -> Result<(String, String)> {
        let uris = images
            .iter()
            .map(|p| encode_data_uri(p))
            .collect::<Result<Vec<_>>>()?;
        self.chat.answer_templates(templates, || {
            uris.iter()
                .map(|url| ContentPart::ImageUrl {
                    image_url: ImageUrl { url: url.clone() },
                })
                .collect()
        })
    }
}

/// A vision-language model served on this machine. Views are passed as `file://` references and
/// the answer length is capped.
pub struct LocalBackend {
    chat: ChatClient,
}

impl LocalBackend {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = build_client(&endpoint)?;
        Ok(Self::with_client(client, endpoint, model, max_tokens))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            chat: ChatClient {
                client,
                endpoint: endpoint.into(),
                model: model.into(),
                api_key: None,
                max_tokens: Some(max_tokens),
            },
        }
    }
}

impl PromptBackend for LocalBackend {
    fn generate(&self, images: &[PathBuf], templates: &PromptTemplates) -> Result<(String, String)> {
        let uris: Vec<String> = images.iter().map(|p| file_uri(p)).collect();
        self.chat.answer_templates(templates, || {
            uris.iter()
                .map(|uri| ContentPart::Image { image: uri.clone() })
                .collect()
        })
    }
}

/// Which backend to talk to, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Hosted {
        endpoint: String,
        model: String,
        api_key: Option<String>,
    },
    Local {
        endpoint: String,
        model: String,
        max_tokens: u32,
    },
}

impl BackendConfig {
    pub fn hosted(api_key: Option<String>) -> Self {
        Self::Hosted {
            endpoint: DEFAULT_HOSTED_ENDPOINT.to_string(),
            model: DEFAULT_HOSTED_MODEL.to_string(),
            api_key,
        }
    }

    pub fn local() -> Self {
        Self::Local {
            endpoint: DEFAULT_LOCAL_ENDPOINT.to_string(),
            model: DEFAULT_LOCAL_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn build(&self) -> Result<Box<dyn PromptBackend>> {
        Ok(match self {
            Self::Hosted {
                endpoint,
                model,
                api_key,
            } => Box::new(HostedBackend::new(endpoint.as_str(), model.as_str(), api_key.clone())?),
            Self::Local {
                endpoint,
                model,
                max_tokens,
            } => Box::new(LocalBackend::new(endpoint.as_str(), model.as_str(), *max_tokens)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_parts_use_chat_completion_shape() {
        let parts = vec![
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/png;base64,AA==".to_string(),
                },
            },
            ContentPart::Image {
                image: "file:///views/0.png".to_string(),
            },
            ContentPart::Text { text: "describe" },
        ];
        assert_eq!(
            serde_json::json!([
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,AA=="}},
                {"type": "image", "image": "file:///views/0.png"},
                {"type": "text", "text": "describe"},
            ]),
            serde_json::to_value(parts).unwrap()
        );
    }

    #[test]
    fn defaults_follow_backend_kind() {
        match BackendConfig::local() {
            BackendConfig::Local {
                model, max_tokens, ..
            } => {
                assert_eq!(DEFAULT_LOCAL_MODEL, model);
                assert_eq!(200, max_tokens);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            BackendConfig::hosted(None),
            BackendConfig::Hosted { api_key: None, .. }
        ));
    }
}
