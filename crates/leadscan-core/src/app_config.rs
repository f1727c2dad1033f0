use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub ai_timeout_secs: u64,
    pub ai_max_retries: u32,
    pub ai_retry_backoff_ms: u64,
    pub collector_url: Option<String>,
    pub source_timeout_secs: u64,
    pub max_items_per_target: usize,
    pub min_text_chars: usize,
    pub scan_interval_minutes: u32,
    pub targets_path: PathBuf,
    pub scan_log_path: PathBuf,
    pub leads_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("gemini_api_key", &"[redacted]")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("ai_timeout_secs", &self.ai_timeout_secs)
            .field("ai_max_retries", &self.ai_max_retries)
            .field("ai_retry_backoff_ms", &self.ai_retry_backoff_ms)
            .field("collector_url", &self.collector_url)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("max_items_per_target", &self.max_items_per_target)
            .field("min_text_chars", &self.min_text_chars)
            .field("scan_interval_minutes", &self.scan_interval_minutes)
            .field("targets_path", &self.targets_path)
            .field("scan_log_path", &self.scan_log_path)
            .field("leads_path", &self.leads_path)
            .finish()
    }
}
