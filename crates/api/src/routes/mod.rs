use crate::error::{ApiError, ApiResult};
use uuid::Uuid;

pub mod alerts;
pub mod analysis;
pub mod portfolio;
pub mod preferences;
pub mod stocks;
pub mod watchlist;

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("invalid id {raw:?}")))
}

/// Splits `"jnj, pg,,KO"` into normalized symbols, dropping blanks.
fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(stratos_core::domain::user::normalize_symbol)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_normalizes_symbol_lists() {
        assert_eq!(split_symbols("jnj, pg,,KO "), vec!["JNJ", "PG", "KO"]);
        assert!(split_symbols(" , ").is_empty());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(parse_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
