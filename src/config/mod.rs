//! Configuration (explicit keys layered over environment variables).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<SwiftConfig> = OnceLock::new();

/// Layered configuration for swift-agent.
///
/// Keys set explicitly via [`set_api_key`](Self::set_api_key) take precedence
/// over values captured from the environment by [`from_env`](Self::from_env).
#[derive(Clone, Default)]
pub struct SwiftConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
}

impl fmt::Debug for SwiftConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwiftConfig")
            .field("providers", &self.api_keys.read().unwrap().keys())
            .field("base_urls", &self.base_urls)
            .finish()
    }
}

impl SwiftConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (loads `.env` first if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let config = Self::new();

        let env_mappings = [
            ("OPENAI_API_KEY", "openai"),
            ("OPENAI_COMPAT_API_KEY", "openai-compatible"),
        ];
        for (env_var, provider) in &env_mappings {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(provider, key);
            }
        }

        let url_mappings = [
            ("OPENAI_BASE_URL", "openai"),
            ("OPENAI_COMPAT_BASE_URL", "openai-compatible"),
        ];
        for (env_var, provider) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        config
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static SwiftConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .unwrap()
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.read().unwrap().get(provider).cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .unwrap()
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.read().unwrap().get(provider).cloned()
    }

    /// Check if a provider has credentials configured.
    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_is_returned() {
        let config = SwiftConfig::new();
        config.set_api_key("openai", "sk-test".to_string());
        assert_eq!(config.get_api_key("openai"), Some("sk-test".to_string()));
        assert!(config.has_credentials("openai"));
    }

    #[test]
    fn missing_provider_returns_none() {
        let config = SwiftConfig::new();
        assert_eq!(config.get_api_key("openai"), None);
        assert!(!config.has_credentials("openai"));
    }

    #[test]
    fn base_url_round_trips() {
        let config = SwiftConfig::new();
        config.set_base_url("openai-compatible", "http://localhost:8080/v1".to_string());
        assert_eq!(
            config.get_base_url("openai-compatible"),
            Some("http://localhost:8080/v1".to_string())
        );
    }

    #[test]
    fn clones_share_state() {
        let config = SwiftConfig::new();
        let clone = config.clone();
        config.set_api_key("openai", "sk-shared".to_string());
        assert_eq!(clone.get_api_key("openai"), Some("sk-shared".to_string()));
    }
}
