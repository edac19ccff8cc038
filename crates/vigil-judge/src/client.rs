//! OpenRouter chat-completions client for the QA judge.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vigil_core::qa::score::{Dimension, DimensionScores};

use crate::error::{JudgeError, JudgeResult};
use crate::parse;

/// Transcripts are cut to this many characters before prompting; enough
/// context to judge against without blowing the token budget.
const TRANSCRIPT_PROMPT_CHARS: usize = 8_000;

/// Judge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// OpenRouter API key.
    pub api_key: String,
    /// Model identifier as OpenRouter knows it.
    pub model: String,
    /// Chat-completions base URL.
    pub base_url: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl JudgeConfig {
    /// Build from environment variables. `OPENROUTER_API_KEY` is required;
    /// `VIGIL_JUDGE_MODEL` and `VIGIL_JUDGE_BASE_URL` override the defaults.
    pub fn from_env() -> JudgeResult<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(JudgeError::MissingApiKey)?;
        Ok(Self {
            api_key,
            model: std::env::var("VIGIL_JUDGE_MODEL")
                .unwrap_or_else(|_| "anthropic/claude-sonnet-4".to_string()),
            base_url: std::env::var("VIGIL_JUDGE_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            temperature: 0.3,
            max_tokens: 4_000,
        })
    }

    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            temperature: 0.3,
            max_tokens: 4_000,
        }
    }
}

/// What one evaluation round returns.
#[derive(Debug, Clone)]
pub struct JudgeVerdict {
    pub dimensions: DimensionScores,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub tokens_used: Option<u64>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u64,
}

/// HTTP client around one judge model.
pub struct JudgeClient {
    config: JudgeConfig,
    http_client: reqwest::Client,
}

impl JudgeClient {
    pub fn new(config: JudgeConfig) -> JudgeResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("vigil/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JudgeError::ClientSetup(e.to_string()))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create client from environment variables.
    pub fn from_env() -> JudgeResult<Self> {
        Self::new(JudgeConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Score one analysis against its transcript.
    pub async fn evaluate(
        &self,
        video_id: &str,
        transcript: &str,
        analysis: &str,
    ) -> JudgeResult<JudgeVerdict> {
        info!(video_id = %video_id, model = %self.config.model, "requesting evaluation");
        let prompt = build_prompt(transcript, analysis);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::ApiStatus { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        let tokens_used = parsed.usage.map(|u| u.total_tokens);
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(JudgeError::EmptyResponse)?;
        debug!(video_id = %video_id, chars = content.len(), "judge replied");

        let raw = parse::extract_json(&content)?;
        let (dimensions, recommendations, strengths) = parse::parse_verdict(&raw)?;
        Ok(JudgeVerdict {
            dimensions,
            recommendations,
            strengths,
            tokens_used,
        })
    }
}

fn build_prompt(transcript: &str, analysis: &str) -> String {
    let transcript: String = transcript.chars().take(TRANSCRIPT_PROMPT_CHARS).collect();
    let dims: String = Dimension::ALL
        .iter()
        .map(|d| format!("- {d}: score 0-10 with issues and examples\n"))
        .collect();

    format!(
        "You are a strict QA reviewer for AI-generated video analyses. Judge \
         the analysis below against the source transcript on these dimensions:\n\
         {dims}\n\
         Respond with a single JSON object: one key per dimension, each an \
         object {{\"score\": <0-10>, \"issues\": [...], \"examples\": [...]}}, \
         plus top-level \"recommendations\" and \"strengths\" string arrays. \
         Wrap the JSON in a ```json fence.\n\n\
         ## Source transcript (may be truncated)\n\n{transcript}\n\n\
         ## Analysis under review\n\n{analysis}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_uses_openrouter_defaults() {
        let config = JudgeConfig::new("key", "anthropic/claude-sonnet-4");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 4_000);
    }

    #[test]
    fn test_prompt_truncates_transcript_and_names_all_dimensions() {
        let transcript = "t".repeat(20_000);
        let prompt = build_prompt(&transcript, "the analysis");
        assert!(prompt.len() < 12_000);
        for dim in Dimension::ALL {
            assert!(prompt.contains(dim.as_str()), "missing {dim}");
        }
        assert!(prompt.contains("the analysis"));
    }

    #[test]
    fn test_client_builds_from_explicit_config() {
        let client = JudgeClient::new(JudgeConfig::new("key", "some/model")).unwrap();
        assert_eq!(client.model(), "some/model");
    }
}
