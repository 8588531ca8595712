use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

pub mod quota;

pub use quota::QuotaConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub vendors: VendorConfig,
    pub billing: BillingConfig,
    pub limits: LimitsConfig,
    pub quotas: QuotaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When unset, development runs fall back to the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HS256 secret shared with the managed auth backend
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub stt_model: String,
    pub image_search_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    pub checkout_base_url: String,
    pub app_base_url: String,
    pub period_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_batch_size: usize,
    pub max_summary_chars: usize,
    pub max_tts_chars: usize,
    pub max_chat_messages: usize,
    pub max_tool_rounds: usize,
    pub default_per_page: u32,
    pub max_per_page: u32,
    pub max_image_results: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("STUDYHUB_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            self.security.jwt_audience = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("WEBHOOK_SECRET") {
            self.security.webhook_secret = v;
        }

        // Vendor overrides
        if let Ok(v) = env::var("GEMINI_API_KEY") {
            self.vendors.gemini_api_key = v;
        }
        if let Ok(v) = env::var("GEMINI_MODEL") {
            self.vendors.gemini_model = v;
        }
        if let Ok(v) = env::var("GEMINI_BASE_URL") {
            self.vendors.gemini_base_url = v;
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.vendors.openai_api_key = v;
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            self.vendors.openai_base_url = v;
        }
        if let Ok(v) = env::var("CHAT_MODEL") {
            self.vendors.chat_model = v;
        }
        if let Ok(v) = env::var("TTS_MODEL") {
            self.vendors.tts_model = v;
        }
        if let Ok(v) = env::var("TTS_VOICE") {
            self.vendors.tts_voice = v;
        }
        if let Ok(v) = env::var("STT_MODEL") {
            self.vendors.stt_model = v;
        }
        if let Ok(v) = env::var("IMAGE_SEARCH_URL") {
            self.vendors.image_search_url = v;
        }
        if let Ok(v) = env::var("VENDOR_TIMEOUT_MS") {
            self.vendors.timeout_ms = v.parse().unwrap_or(self.vendors.timeout_ms);
        }

        // Billing overrides
        if let Ok(v) = env::var("CHECKOUT_BASE_URL") {
            self.billing.checkout_base_url = v;
        }
        if let Ok(v) = env::var("APP_BASE_URL") {
            self.billing.app_base_url = v;
        }
        if let Ok(v) = env::var("BILLING_PERIOD_DAYS") {
            self.billing.period_days = v.parse().unwrap_or(self.billing.period_days);
        }

        // Limit overrides
        if let Ok(v) = env::var("PAGINATION_MAX_PER_PAGE") {
            self.limits.max_per_page = v.parse().unwrap_or(self.limits.max_per_page);
        }
        if let Ok(v) = env::var("TUTOR_MAX_TOOL_ROUNDS") {
            self.limits.max_tool_rounds = v.parse().unwrap_or(self.limits.max_tool_rounds);
        }

        if let Ok(path) = env::var("QUOTA_LIMITS_FILE") {
            if let Err(e) = self.quotas.apply_file(&path) {
                tracing::warn!("Ignoring quota file {}: {}", path, e);
            }
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                max_request_size_bytes: 25 * 1024 * 1024, // 25MB, audio uploads
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_audience: "authenticated".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                webhook_secret: "dev-webhook-secret".to_string(),
            },
            vendors: VendorConfig::defaults(),
            billing: BillingConfig {
                checkout_base_url: "https://pay.example.com/checkout".to_string(),
                app_base_url: "http://localhost:3000".to_string(),
                period_days: 30,
            },
            limits: LimitsConfig::defaults(),
            quotas: QuotaConfig::defaults(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.max_request_size_bytes = 10 * 1024 * 1024;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_secret = String::new();
        config.security.jwt_expiry_hours = 24;
        config.security.cors_origins = vec!["https://staging.preparamed.com.br".to_string()];
        config.security.webhook_secret = String::new();
        config.billing.app_base_url = "https://staging.preparamed.com.br".to_string();
        config
    }

    fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.jwt_expiry_hours = 4;
        config.security.cors_origins = vec!["https://preparamed.com.br".to_string()];
        config.billing.app_base_url = "https://preparamed.com.br".to_string();
        config.limits.max_per_page = 50;
        config
    }
}

impl VendorConfig {
    fn defaults() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            stt_model: "whisper-1".to_string(),
            image_search_url: "https://openi.nlm.nih.gov".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl LimitsConfig {
    fn defaults() -> Self {
        Self {
            max_batch_size: 500,
            max_summary_chars: 30_000,
            max_tts_chars: 4_096,
            max_chat_messages: 20,
            max_tool_rounds: 3,
            default_per_page: 20,
            max_per_page: 100,
            max_image_results: 20,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.database.url.is_none());
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.limits.max_tool_rounds, 3);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        // Secrets must come from the environment outside development
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.security.webhook_secret.is_empty());
        assert_eq!(config.limits.max_per_page, 50);
    }
}
