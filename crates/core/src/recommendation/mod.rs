//! Recommendation strategies.
//!
//! Callers hold a [`FallbackRecommender`]: it runs the configured [`Recommender`] and, when that
//! fails for any reason, silently substitutes the rule-based verdict. The response shape is the
//! same either way.

use crate::config::Settings;
use crate::domain::recommendation::StockRecommendation;
use crate::domain::stock::StockRecord;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::LlmClient;
use std::sync::Arc;

pub mod rules;

pub use rules::rule_based_recommendation;

#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    fn name(&self) -> String;

    async fn recommend(&self, stock: &StockRecord) -> anyhow::Result<StockRecommendation>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedRecommender;

#[async_trait::async_trait]
impl Recommender for RuleBasedRecommender {
    fn name(&self) -> String {
        "rule_based".to_string()
    }

    async fn recommend(&self, stock: &StockRecord) -> anyhow::Result<StockRecommendation> {
        Ok(rule_based_recommendation(stock))
    }
}

/// Delegates scoring to an external advisory service. Single attempt.
#[derive(Clone)]
pub struct AdvisoryRecommender {
    client: Arc<dyn LlmClient>,
}

impl AdvisoryRecommender {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Recommender for AdvisoryRecommender {
    fn name(&self) -> String {
        format!("advisory:{}", self.client.provider())
    }

    async fn recommend(&self, stock: &StockRecord) -> anyhow::Result<StockRecommendation> {
        self.client.recommend_stock(stock).await
    }
}

#[derive(Clone)]
pub struct FallbackRecommender {
    primary: Arc<dyn Recommender>,
}

impl FallbackRecommender {
    pub fn new(primary: Arc<dyn Recommender>) -> Self {
        Self { primary }
    }

    pub fn rule_based() -> Self {
        Self::new(Arc::new(RuleBasedRecommender))
    }

    /// Advisory-backed when a provider is configured, rule-based otherwise. A provider that is
    /// configured but cannot be built (e.g. missing key) is reported as an error.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(match crate::llm::client_from_settings(settings)? {
            Some(client) => Self::new(Arc::new(AdvisoryRecommender::new(client))),
            None => Self::rule_based(),
        })
    }

    pub fn strategy_name(&self) -> String {
        self.primary.name()
    }

    pub async fn recommend(&self, stock: &StockRecord) -> StockRecommendation {
        match self.primary.recommend(stock).await {
            Ok(rec) => rec,
            Err(err) => {
                let diag = err.downcast_ref::<LlmDiagnosticsError>();
                tracing::warn!(
                    symbol = %stock.symbol,
                    strategy = %self.primary.name(),
                    stage = diag.map(|d| d.stage.as_str()),
                    error = %format!("{err:#}"),
                    "recommendation strategy failed; using rule-based verdict"
                );
                if let Some(raw) = diag.and_then(|d| d.raw_output.as_deref()) {
                    tracing::debug!(symbol = %stock.symbol, raw_output = %raw, "advisory raw output");
                }
                rule_based_recommendation(stock)
            }
        }
    }
}
