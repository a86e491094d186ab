use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PortfolioHolding {
    pub id: Uuid,
    pub symbol: String,
    pub shares: f64,
    pub purchase_price: f64,
    pub purchase_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PortfolioHolding {
    pub fn cost(&self) -> f64 {
        self.shares * self.purchase_price
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoldingInput {
    pub symbol: String,
    pub shares: f64,
    pub purchase_price: f64,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HoldingUpdate {
    #[serde(default)]
    pub shares: Option<f64>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A holding plus its read-time valuation. The valuation fields are `None` when no fresh price
/// could be resolved; they are never reported as zero in that case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValuation {
    pub id: Uuid,
    pub symbol: String,
    pub name: Option<String>,
    pub shares: f64,
    pub purchase_price: f64,
    pub current_price: Option<f64>,
    pub purchase_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub current_value: Option<f64>,
    pub gain_loss: Option<f64>,
    pub gain_loss_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub holdings_count: usize,
    pub holdings: Vec<HoldingValuation>,
}

impl PortfolioSummary {
    pub fn empty() -> Self {
        Self {
            total_value: 0.0,
            total_cost: 0.0,
            total_gain_loss: 0.0,
            total_gain_loss_percent: 0.0,
            holdings_count: 0,
            holdings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAnalysis {
    pub overall_score: f64,
    pub diversification_score: f64,
    pub risk_assessment: String,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub sector_allocation: BTreeMap<String, f64>,
}
