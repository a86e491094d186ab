use crate::domain::contract::AdvisoryVerdict;
use crate::domain::recommendation::StockRecommendation;
use anyhow::Context;

/// Locates the JSON object in a model reply: the body of a Markdown code fence, otherwise the
/// span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let text = text.trim();
    if let Some(fenced) = text.strip_prefix("```") {
        // The opening line may carry an info string such as `json`.
        let body = fenced.split_once('\n').map_or("", |(_, rest)| rest);
        let body = body.rfind("```").map_or(body, |end| &body[..end]);
        return Some(body.trim());
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| text[start..=end].trim())
}

pub fn parse_recommendation(text: &str, symbol: &str) -> anyhow::Result<StockRecommendation> {
    let json_str = extract_json(text).unwrap_or(text.trim());
    let parsed = serde_json::from_str::<AdvisoryVerdict>(json_str)
        .with_context(|| format!("advisory output is not valid JSON for verdict schema: {json_str}"))?;
    parsed.validate_and_into_recommendation(symbol)
}
