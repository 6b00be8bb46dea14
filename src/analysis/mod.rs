//! Turning a canvas image into Helm chart text via a hosted multimodal model.

mod prompt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ResolvedAnalysisConfig};
use crate::error::AnalysisError;

pub use prompt::ANALYSIS_PROMPT;

const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.1;

/// Anything that can turn a PNG of the canvas into chart text.
///
/// The session only talks to this trait, so tests can answer deterministically.
pub trait DiagramAnalyzer: Send + Sync {
    fn analyze(&self, png: &[u8]) -> Result<String, AnalysisError>;
}

/// `data:` URL for a PNG payload
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub total_tokens: u32,
}

impl ChatRequest {
    /// Single user turn: the instruction plus the image
    pub fn for_image(png: &[u8]) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: ANALYSIS_PROMPT.to_owned(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: png_data_url(png),
                            detail: "high",
                        },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

impl ChatResponse {
    /// Generated text of the first choice, untouched
    pub fn into_text(self) -> Result<String, AnalysisError> {
        if let Some(usage) = &self.usage {
            log::info!("Tokens used: {}", usage.total_tokens);
        }
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalysisError::InvalidResponse("No content in first choice".to_owned()))
    }
}

// ============================================================================
// Azure OpenAI client
// ============================================================================

/// Chat-completions client for an Azure OpenAI vision deployment
#[derive(Clone)]
pub struct AzureOpenAiClient {
    config: AnalysisConfig,
    agent: ureq::Agent,
}

impl std::fmt::Debug for AzureOpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AzureOpenAiClient {
    pub fn new(config: AnalysisConfig) -> Self {
        // No timeout: a hung request keeps the session busy until it returns.
        let agent = ureq::AgentBuilder::new().build();
        Self { config, agent }
    }

    pub fn from_env() -> Self {
        Self::new(AnalysisConfig::from_env())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn send(&self, config: &ResolvedAnalysisConfig, png: &[u8]) -> Result<String, AnalysisError> {
        let url = config.chat_completions_url();
        log::info!(
            "Calling Azure OpenAI deployment {} (api-version {}, image {} KB)",
            config.deployment,
            config.api_version,
            png.len() / 1024
        );

        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("api-key", &config.api_key)
            .send_json(ChatRequest::for_image(png));

        match response {
            Ok(resp) => {
                let body: ChatResponse = resp
                    .into_json()
                    .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
                log::info!("Azure OpenAI response received");
                body.into_text()
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                log::error!("Azure OpenAI API error response ({status}): {body}");
                Err(AnalysisError::Endpoint { status, body })
            }
            Err(ureq::Error::Transport(e)) => Err(AnalysisError::Transport(e.to_string())),
        }
    }
}

impl DiagramAnalyzer for AzureOpenAiClient {
    fn analyze(&self, png: &[u8]) -> Result<String, AnalysisError> {
        let config = self.config.resolve().inspect_err(|err| {
            log::error!("{err}");
        })?;
        self.send(&config, png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_fails_without_a_request() {
        let client = AzureOpenAiClient::new(AnalysisConfig::default());
        let err = client.analyze(&[1, 2, 3]).unwrap_err();
        match &err {
            AnalysisError::MissingConfig(items) => assert_eq!(items.len(), 3),
            other => panic!("unexpected error {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("AZURE_OPENAI_ENDPOINT"));
        assert!(message.contains("AZURE_OPENAI_API_KEY"));
        assert!(message.contains("AZURE_OPENAI_DEPLOYMENT_NAME"));
    }

    #[test]
    fn request_body_carries_prompt_and_image() {
        let body = serde_json::to_value(ChatRequest::for_image(b"png")).unwrap();

        assert_eq!(body["max_tokens"], 4000);
        let content = &body["messages"][0]["content"];
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], ANALYSIS_PROMPT);
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,cG5n");
        assert_eq!(content[1]["image_url"]["detail"], "high");
    }

    #[test]
    fn response_text_is_returned_verbatim() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  apiVersion: v2\n"}}],"usage":{"total_tokens":12}}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "  apiVersion: v2\n");
    }

    #[test]
    fn empty_choices_are_an_invalid_response() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(AnalysisError::InvalidResponse(_))
        ));
    }

    #[test]
    fn prompt_names_every_mapping() {
        for needle in ["Rectangles", "Circles", "Lines/Arrows", "Text labels", "{{ .Values.* }}"] {
            assert!(ANALYSIS_PROMPT.contains(needle), "prompt lacks {needle}");
        }
    }
}
