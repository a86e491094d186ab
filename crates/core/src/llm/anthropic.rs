//! Anthropic Messages API. The verdict is requested through a forced `emit_verdict` tool call;
//! a prose reply is still accepted when it contains a verdict object.

use crate::config::{env_or, env_parse, Settings};
use crate::domain::contract::AdvisoryVerdict;
use crate::domain::recommendation::StockRecommendation;
use crate::domain::stock::StockRecord;
use crate::llm::error::{FailureStage, LlmDiagnosticsError};
use crate::llm::{json, prompt};
use crate::llm::{LlmClient, Provider};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const API_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const VERDICT_TOOL: &str = "emit_verdict";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url = env_or("ANTHROPIC_BASE_URL", DEFAULT_BASE_URL);
        let timeout = Duration::from_secs(env_parse("ANTHROPIC_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("build Anthropic http client failed")?,
            api_key,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            model: env_or("ANTHROPIC_MODEL", DEFAULT_MODEL),
            max_tokens: env_parse("ANTHROPIC_MAX_TOKENS", DEFAULT_MAX_TOKENS),
        })
    }

    fn request<'a>(&'a self, user_prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: prompt::SYSTEM_PROMPT,
            messages: [Turn {
                role: "user",
                content: user_prompt,
            }],
            tools: [ToolSpec {
                name: VERDICT_TOOL,
                description: "Record the recommendation verdict for the analysed stock",
                input_schema: prompt::verdict_schema(),
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: VERDICT_TOOL,
            },
        }
    }

    /// Returns the raw body alongside the decoded one so failures can carry it.
    async fn send(
        &self,
        symbol: &str,
        body: &MessagesRequest<'_>,
    ) -> anyhow::Result<(Value, MessagesResponse)> {
        let res = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Anthropic request failed for {symbol}"))?;

        let status = res.status();
        let text = res.text().await.context("read Anthropic response failed")?;
        if !status.is_success() {
            let raw = serde_json::from_str::<Value>(&text).ok();
            return Err(LlmDiagnosticsError::new(
                Provider::Anthropic,
                FailureStage::Http,
                symbol,
                format!("status={status}"),
            )
            .with_raw_output(text)
            .with_raw_json(raw)
            .into());
        }

        let raw: Value = serde_json::from_str(&text)
            .with_context(|| format!("Anthropic response is not JSON: {text}"))?;
        let decoded = MessagesResponse::deserialize(&raw)
            .context("Anthropic response does not match the messages schema")?;
        Ok((raw, decoded))
    }
}

impl MessagesResponse {
    fn verdict_input(&self) -> Option<&Value> {
        self.content.iter().find_map(|block| match block {
            Block::ToolUse { name, input } if name == VERDICT_TOOL => Some(input),
            _ => None,
        })
    }

    fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                Block::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn recommend_stock(&self, stock: &StockRecord) -> anyhow::Result<StockRecommendation> {
        let symbol = stock.symbol.as_str();
        let user_prompt = prompt::user_prompt(stock);
        let (raw, res) = self.send(symbol, &self.request(&user_prompt)).await?;

        let diag = |stage: FailureStage, detail: String| {
            LlmDiagnosticsError::new(Provider::Anthropic, stage, symbol, detail)
                .with_raw_json(Some(raw.clone()))
        };

        if let Some(input) = res.verdict_input() {
            return AdvisoryVerdict::deserialize(input)
                .map_err(anyhow::Error::from)
                .and_then(|v| v.validate_and_into_recommendation(symbol))
                .map_err(|err| {
                    diag(FailureStage::Parse, format!("{err:#}"))
                        .with_raw_output(input.to_string())
                        .into()
                });
        }

        // Prose reply: one parse attempt, no repair round-trip.
        let text = res.joined_text();
        if text.trim().is_empty() {
            return Err(diag(FailureStage::EmptyReply, "no verdict tool call and no text".into()).into());
        }
        json::parse_recommendation(&text, symbol).map_err(|err| {
            diag(FailureStage::Parse, format!("{err:#}"))
                .with_raw_output(text.as_str())
                .into()
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'static str,
    messages: [Turn<'a>; 1],
    tools: [ToolSpec; 1],
    tool_choice: ToolChoice,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolSpec {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<Block>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text {
        text: String,
    },
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}
