//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reconciliation workflow configuration.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// AI suggestion service configuration.
    #[serde(default)]
    pub ai: AiConfig,
    /// Database configuration; absent means the in-memory store is used.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reconciliation workflow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Users allowed to approve or reject proposals.
    #[serde(default)]
    pub reviewers: Vec<Uuid>,
    /// Minimum length of justifications and rejection comments.
    #[serde(default = "default_min_justification_len")]
    pub min_justification_len: usize,
    /// Confidence at or above which a rule suggestion is proposed automatically.
    #[serde(default = "default_auto_propose_threshold")]
    pub auto_propose_threshold: Decimal,
    /// Maximum distance in days between a transaction and its counterpart.
    #[serde(default = "default_match_date_window_days")]
    pub match_date_window_days: i64,
    /// Transit account debited when a credit is classified.
    #[serde(default = "default_transit_credit_account")]
    pub transit_credit_account: String,
    /// Transit account credited when a debit is classified.
    #[serde(default = "default_transit_debit_account")]
    pub transit_debit_account: String,
    /// Currency of imported statements.
    #[serde(default)]
    pub currency: Currency,
}

fn default_min_justification_len() -> usize {
    10
}

fn default_auto_propose_threshold() -> Decimal {
    Decimal::new(90, 2)
}

fn default_match_date_window_days() -> i64 {
    2
}

fn default_transit_credit_account() -> String {
    "2.1.9.01".to_string()
}

fn default_transit_debit_account() -> String {
    "1.1.9.01".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            reviewers: Vec::new(),
            min_justification_len: default_min_justification_len(),
            auto_propose_threshold: default_auto_propose_threshold(),
            match_date_window_days: default_match_date_window_days(),
            transit_credit_account: default_transit_credit_account(),
            transit_debit_account: default_transit_debit_account(),
            currency: Currency::default(),
        }
    }
}

/// AI suggestion service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Whether the classifier may call the AI service at all.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the generative API.
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// API key; required when enabled.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt for retryable failures.
    #[serde(default = "default_ai_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds, doubled on every retry.
    #[serde(default = "default_ai_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    30
}

fn default_ai_max_retries() -> u32 {
    2
}

fn default_ai_backoff_ms() -> u64 {
    500
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            api_key: None,
            timeout_secs: default_ai_timeout_secs(),
            max_retries: default_ai_max_retries(),
            backoff_ms: default_ai_backoff_ms(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "conciliar=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later overriding earlier: `config/default`,
    /// `config/{RUN_MODE}`, then `CONCILIAR__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CONCILIAR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("workflow.reviewers")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns true if the user is a designated reviewer.
    #[must_use]
    pub fn is_reviewer(&self, user: Uuid) -> bool {
        self.workflow.reviewers.contains(&user)
    }
}
