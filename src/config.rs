use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EXA_BASE_URL: &str = "https://api.exa.ai";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_STATIC_DIR: &str = "static";

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub exa_api_key: String,
    pub exa_base_url: String,
}

impl Config {
    /// Missing API keys are left empty; the providers reject them at call time.
    pub fn from_env() -> Config {
        Config {
            openai_api_key: get_env_or_default("OPENAI_API_KEY", ""),
            openai_base_url: get_env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openai_model: get_env_or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            exa_api_key: get_env_or_default("EXA_API_KEY", ""),
            exa_base_url: get_env_or_default("EXA_BASE_URL", DEFAULT_EXA_BASE_URL),
        }
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[test]
fn test_get_env_or_default_falls_back() {
    let value = get_env_or_default("WEB_RAG_SURELY_UNSET_VARIABLE", "fallback");
    assert_eq!(value, "fallback");
}
