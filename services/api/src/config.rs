use krishi_core::{llm_client::HuggingFaceConfig, telemetry::ThingSpeakConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co/models/google/gemma-2b-it";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported backends for free-form replies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    HuggingFace,
    OpenAI,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub thingspeak_base_url: String,
    pub channel_id: String,
    pub read_api_key: String,
    pub write_api_key: String,
    pub provider: Provider,
    pub hf_api_url: String,
    pub hf_api_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub chat_model: String,
    pub log_level: Level,
    pub prompts_path: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let thingspeak_base_url = std::env::var("THINGSPEAK_BASE_URL")
            .unwrap_or_else(|_| "https://api.thingspeak.com".to_string());
        let channel_id = required("THINGSPEAK_CHANNEL_ID")?;
        let read_api_key = required("THINGSPEAK_READ_API_KEY")?;
        let write_api_key = required("THINGSPEAK_WRITE_API_KEY")?;

        let provider_str =
            std::env::var("MODEL_PROVIDER").unwrap_or_else(|_| "huggingface".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "huggingface" | "hf" => Provider::HuggingFace,
            "openai" => Provider::OpenAI,
            other => {
                return Err(ConfigError::InvalidValue(
                    "MODEL_PROVIDER".to_string(),
                    format!("'{}' is not one of 'huggingface' or 'openai'", other),
                ));
            }
        };

        let hf_api_url =
            std::env::var("HF_API_URL").unwrap_or_else(|_| DEFAULT_HF_API_URL.to_string());
        let hf_api_token = std::env::var("HF_API_TOKEN").ok();
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let openai_api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./prompts"));

        if provider == Provider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar(
                "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            thingspeak_base_url,
            channel_id,
            read_api_key,
            write_api_key,
            provider,
            hf_api_url,
            hf_api_token,
            openai_api_key,
            openai_api_base,
            chat_model,
            log_level,
            prompts_path,
        })
    }

    /// Connection settings for the ThingSpeak channel.
    pub fn thingspeak(&self) -> ThingSpeakConfig {
        ThingSpeakConfig {
            base_url: self.thingspeak_base_url.clone(),
            channel_id: self.channel_id.clone(),
            read_api_key: self.read_api_key.clone(),
            write_api_key: self.write_api_key.clone(),
        }
    }

    pub fn hugging_face(&self) -> HuggingFaceConfig {
        HuggingFaceConfig {
            api_url: self.hf_api_url.clone(),
            api_token: self.hf_api_token.clone(),
        }
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            for var in [
                "BIND_ADDRESS",
                "THINGSPEAK_BASE_URL",
                "THINGSPEAK_CHANNEL_ID",
                "THINGSPEAK_READ_API_KEY",
                "THINGSPEAK_WRITE_API_KEY",
                "MODEL_PROVIDER",
                "HF_API_URL",
                "HF_API_TOKEN",
                "OPENAI_API_KEY",
                "OPENAI_API_BASE",
                "CHAT_MODEL",
                "RUST_LOG",
                "PROMPTS_PATH",
            ] {
                env::remove_var(var);
            }
        }
    }

    fn set_minimal_env() {
        unsafe {
            env::set_var("THINGSPEAK_CHANNEL_ID", "3186649");
            env::set_var("THINGSPEAK_READ_API_KEY", "test-read-key");
            env::set_var("THINGSPEAK_WRITE_API_KEY", "test-write-key");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal() {
        clear_env_vars();
        set_minimal_env();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:5000");
        assert_eq!(config.thingspeak_base_url, "https://api.thingspeak.com");
        assert_eq!(config.channel_id, "3186649");
        assert_eq!(config.provider, Provider::HuggingFace);
        assert_eq!(config.hf_api_url, DEFAULT_HF_API_URL);
        assert_eq!(config.hf_api_token, None);
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.prompts_path, PathBuf::from("./prompts"));

        let thingspeak = config.thingspeak();
        assert_eq!(thingspeak.read_api_key, "test-read-key");
        assert_eq!(thingspeak.write_api_key, "test-write-key");
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("THINGSPEAK_BASE_URL", "http://localhost:3001");
            env::set_var("MODEL_PROVIDER", "OpenAI");
            env::set_var("OPENAI_API_KEY", "custom-openai-key");
            env::set_var("CHAT_MODEL", "gpt-4o");
            env::set_var("HF_API_TOKEN", "hf_token");
            env::set_var("RUST_LOG", "debug");
            env::set_var("PROMPTS_PATH", "/custom/prompts");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.thingspeak().base_url, "http://localhost:3001");
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.openai_api_key, Some("custom-openai-key".to_string()));
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.hugging_face().api_token, Some("hf_token".to_string()));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.prompts_path, PathBuf::from("/custom/prompts"));
    }

    #[test]
    #[serial]
    fn test_config_missing_channel() {
        clear_env_vars();
        unsafe {
            env::set_var("THINGSPEAK_READ_API_KEY", "test-read-key");
            env::set_var("THINGSPEAK_WRITE_API_KEY", "test-write-key");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "THINGSPEAK_CHANNEL_ID"),
            _ => panic!("Expected MissingVar for THINGSPEAK_CHANNEL_ID"),
        }
    }

    #[test]
    #[serial]
    fn test_config_blank_key_is_missing() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("THINGSPEAK_WRITE_API_KEY", "  ");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "THINGSPEAK_WRITE_API_KEY"),
            _ => panic!("Expected MissingVar for THINGSPEAK_WRITE_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_config_unknown_provider() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("MODEL_PROVIDER", "llama");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, msg) => {
                assert_eq!(var, "MODEL_PROVIDER");
                assert!(msg.contains("llama"));
            }
            _ => panic!("Expected InvalidValue for MODEL_PROVIDER"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_openai_key() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("MODEL_PROVIDER", "openai");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => {
                assert!(msg.contains("OPENAI_API_KEY"));
            }
            _ => panic!("Expected MissingVar for OPENAI_API_KEY"),
        }
    }
}
