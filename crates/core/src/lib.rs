pub mod alerts;
pub mod analytics;
pub mod domain;
pub mod ingest;
pub mod llm;
pub mod recommendation;
pub mod screening;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub stock_data_base_url: Option<String>,
        pub stock_data_api_key: Option<String>,
        pub stock_data_fixtures: Option<String>,
        pub advisory_provider: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub openai_api_key: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                stock_data_base_url: non_empty_var("STOCK_DATA_BASE_URL"),
                stock_data_api_key: non_empty_var("STOCK_DATA_API_KEY"),
                stock_data_fixtures: non_empty_var("STOCK_DATA_FIXTURES"),
                advisory_provider: non_empty_var("ADVISORY_PROVIDER"),
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                openai_api_key: non_empty_var("OPENAI_API_KEY"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_stock_data_base_url(&self) -> anyhow::Result<&str> {
            self.stock_data_base_url
                .as_deref()
                .context("STOCK_DATA_BASE_URL is required")
        }
    }

    /// Optional tuning knob with a fallback; blank values count as unset.
    pub fn env_or(key: &str, default: &str) -> String {
        non_empty_var(key).unwrap_or_else(|| default.to_string())
    }

    /// Unparseable values fall back silently, like unset ones.
    pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
        non_empty_var(key)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
