use crate::config::{env_or, env_parse, Settings};
use crate::domain::recommendation::StockRecommendation;
use crate::domain::stock::StockRecord;
use crate::llm::error::{FailureStage, LlmDiagnosticsError};
use crate::llm::{json, prompt};
use crate::llm::{LlmClient, Provider};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url = env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL);
        let timeout = Duration::from_secs(env_parse("OPENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build OpenAI http client failed")?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
        })
    }

    fn request(&self, stock: &StockRecord) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::user_prompt(stock),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat { kind: "json_object" },
        }
    }

    fn first_choice_text(res: &ChatCompletionResponse) -> Option<&str> {
        res.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn recommend_stock(&self, stock: &StockRecord) -> anyhow::Result<StockRecommendation> {
        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(stock))
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(LlmDiagnosticsError::new(
                Provider::OpenAI,
                FailureStage::Http,
                &stock.symbol,
                format!("status={status}"),
            )
            .with_raw_output(text)
            .with_raw_json(raw_response_json)
            .into());
        }

        let parsed = serde_json::from_str::<ChatCompletionResponse>(&text)
            .with_context(|| format!("failed to decode OpenAI response: {text}"))?;
        let Some(content) = Self::first_choice_text(&parsed) else {
            return Err(LlmDiagnosticsError::new(
                Provider::OpenAI,
                FailureStage::EmptyReply,
                &stock.symbol,
                "response had no message content",
            )
            .with_raw_output(text)
            .into());
        };

        json::parse_recommendation(content, &stock.symbol).map_err(|err| {
            LlmDiagnosticsError::new(
                Provider::OpenAI,
                FailureStage::Parse,
                &stock.symbol,
                format!("{err:#}"),
            )
            .with_raw_output(content)
            .into()
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_first_choice_content() {
        let res: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "{\"a\":1}"}, "finish_reason": "stop"}
            ]
        }))
        .unwrap();
        assert_eq!(OpenAiClient::first_choice_text(&res), Some("{\"a\":1}"));

        let empty: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(OpenAiClient::first_choice_text(&empty), None);
    }

    #[test]
    fn request_asks_for_json_object() {
        let settings = Settings {
            openai_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let client = OpenAiClient::from_settings(&settings).unwrap();
        let stock = StockRecord::new("O", "Realty Income", "Real Estate", 55.0);
        let v = serde_json::to_value(client.request(&stock)).unwrap();
        assert_eq!(v["response_format"], json!({"type": "json_object"}));
        assert_eq!(v["max_tokens"], json!(500));
        assert_eq!(v["messages"][0]["role"], json!("system"));
        assert!(v["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Stock: O - Realty Income"));
    }
}
