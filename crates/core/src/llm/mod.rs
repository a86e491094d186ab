use crate::config::Settings;
use crate::domain::recommendation::StockRecommendation;
use crate::domain::stock::StockRecord;
use std::fmt;
use std::sync::Arc;

pub mod anthropic;
pub mod error;
pub mod json;
pub mod openai;
pub mod prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
        })
    }
}

/// External advisory service that can score a stock in place of the rule-based scorer.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn recommend_stock(&self, stock: &StockRecord) -> anyhow::Result<StockRecommendation>;
}

/// Picks the advisory provider from `ADVISORY_PROVIDER`, or from whichever API key is present
/// (Anthropic first). `Ok(None)` means no advisory service is configured.
pub fn resolve_provider(settings: &Settings) -> anyhow::Result<Option<Provider>> {
    match settings
        .advisory_provider
        .as_deref()
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("anthropic") => Ok(Some(Provider::Anthropic)),
        Some("openai") => Ok(Some(Provider::OpenAI)),
        Some("none") | Some("rule_based") => Ok(None),
        Some(other) => anyhow::bail!("unknown ADVISORY_PROVIDER {other:?}"),
        None if settings.anthropic_api_key.is_some() => Ok(Some(Provider::Anthropic)),
        None if settings.openai_api_key.is_some() => Ok(Some(Provider::OpenAI)),
        None => Ok(None),
    }
}

pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Option<Arc<dyn LlmClient>>> {
    let client: Arc<dyn LlmClient> = match resolve_provider(settings)? {
        Some(Provider::Anthropic) => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
        Some(Provider::OpenAI) => Arc::new(openai::OpenAiClient::from_settings(settings)?),
        None => return Ok(None),
    };
    Ok(Some(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_provider_from_keys() {
        let mut settings = Settings::default();
        assert_eq!(resolve_provider(&settings).unwrap(), None);

        settings.openai_api_key = Some("sk-test".into());
        assert_eq!(resolve_provider(&settings).unwrap(), Some(Provider::OpenAI));

        settings.anthropic_api_key = Some("sk-ant-test".into());
        assert_eq!(resolve_provider(&settings).unwrap(), Some(Provider::Anthropic));
    }

    #[test]
    fn explicit_provider_wins() {
        let settings = Settings {
            advisory_provider: Some("None".into()),
            anthropic_api_key: Some("sk-ant-test".into()),
            ..Default::default()
        };
        assert_eq!(resolve_provider(&settings).unwrap(), None);

        let settings = Settings {
            advisory_provider: Some("gemini".into()),
            ..Default::default()
        };
        assert!(resolve_provider(&settings).is_err());
    }
}
