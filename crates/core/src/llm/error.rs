use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

/// Where an advisory call broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Non-2xx status from the provider.
    Http,
    /// The reply carried no usable content.
    EmptyReply,
    /// Content was present but did not satisfy the verdict contract.
    Parse,
}

impl FailureStage {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureStage::Http => "http",
            FailureStage::EmptyReply => "empty_reply",
            FailureStage::Parse => "parse",
        }
    }
}

/// Advisory failure with enough context to debug the provider without re-running it. Travels
/// inside `anyhow::Error`; callers recover it with `downcast_ref`.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: FailureStage,
    pub symbol: String,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    pub fn new(
        provider: Provider,
        stage: FailureStage,
        symbol: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            stage,
            symbol: symbol.to_string(),
            detail: detail.into(),
            raw_output: None,
            raw_response_json: None,
        }
    }

    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }

    pub fn with_raw_json(mut self, raw: Option<Value>) -> Self {
        self.raw_response_json = raw;
        self
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} advisory failed for {} at {}: {}",
            self.provider,
            self.symbol,
            self.stage.as_str(),
            self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_anyhow_round_trip() {
        let err: anyhow::Error =
            LlmDiagnosticsError::new(Provider::OpenAI, FailureStage::Parse, "KO", "bad verdict")
                .with_raw_output("{\"recommendation\": \"maybe\"}")
                .into();

        assert_eq!(
            err.to_string(),
            "openai advisory failed for KO at parse: bad verdict"
        );
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, FailureStage::Parse);
        assert!(diag.raw_output.as_deref().unwrap().contains("maybe"));
    }
}
