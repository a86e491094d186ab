use crate::domain::recommendation::{RiskLevel, StockRecommendation, Verdict};
use anyhow::ensure;
use serde::{Deserialize, Serialize};

/// Verdict shape an advisory service must emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryVerdict {
    pub recommendation: Verdict,
    pub confidence: f64,
    pub summary: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub target_price: Option<f64>,
    pub risk_level: RiskLevel,
}

impl AdvisoryVerdict {
    /// The symbol always comes from the record that was analysed, never from the advisory output.
    pub fn validate_and_into_recommendation(
        self,
        symbol: &str,
    ) -> anyhow::Result<StockRecommendation> {
        ensure!(
            self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence),
            "confidence must be between 0 and 1 (got {})",
            self.confidence
        );

        let summary = self.summary.trim().to_string();
        ensure!(!summary.is_empty(), "summary must be non-empty");

        if let Some(target) = self.target_price {
            ensure!(
                target.is_finite() && target > 0.0,
                "target_price must be positive (got {target})"
            );
        }

        Ok(StockRecommendation {
            symbol: symbol.to_string(),
            recommendation: self.recommendation,
            confidence: self.confidence,
            summary,
            pros: clean_lines(self.pros),
            cons: clean_lines(self.cons),
            target_price: self.target_price,
            risk_level: self.risk_level,
        })
    }
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn verdict(confidence: f64) -> AdvisoryVerdict {
        serde_json::from_value(json!({
            "recommendation": "buy",
            "confidence": confidence,
            "summary": "  Solid dividend payer.  ",
            "pros": ["Stable cash flow", "  "],
            "cons": ["Slow growth"],
            "target_price": null,
            "risk_level": "low",
        }))
        .unwrap()
    }

    #[test]
    fn takes_symbol_from_record_and_trims() {
        let rec = verdict(0.7).validate_and_into_recommendation("KO").unwrap();
        assert_eq!(rec.symbol, "KO");
        assert_eq!(rec.recommendation, Verdict::Buy);
        assert_eq!(rec.summary, "Solid dividend payer.");
        assert_eq!(rec.pros, vec!["Stable cash flow".to_string()]);
        assert_eq!(rec.risk_level, RiskLevel::Low);
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        assert!(verdict(1.2).validate_and_into_recommendation("KO").is_err());
        assert!(verdict(-0.1).validate_and_into_recommendation("KO").is_err());
    }

    #[test]
    fn rejects_unknown_verdict_label() {
        let res = serde_json::from_value::<AdvisoryVerdict>(json!({
            "recommendation": "moon",
            "confidence": 0.5,
            "summary": "x",
            "risk_level": "low",
        }));
        assert!(res.is_err());
    }
}
