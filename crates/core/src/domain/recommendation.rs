use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-level verdict scale, ordered from most bearish to most bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::StrongSell => "strong_sell",
            Verdict::Sell => "sell",
            Verdict::Hold => "hold",
            Verdict::Buy => "buy",
            Verdict::StrongBuy => "strong_buy",
        }
    }

    pub fn is_buy(self) -> bool {
        matches!(self, Verdict::Buy | Verdict::StrongBuy)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        })
    }
}

/// Recommendation produced fresh per request. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecommendation {
    pub symbol: String,
    pub recommendation: Verdict,
    pub confidence: f64,
    pub summary: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub target_price: Option<f64>,
    pub risk_level: RiskLevel,
}
