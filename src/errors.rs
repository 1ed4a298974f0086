use thiserror::Error;

/// Everything that can go wrong between receiving a query and getting an answer back.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("{provider} authentication failed: {message}")]
    Authentication {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} rate limit exceeded: {message}")]
    RateLimited {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned {status}: {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned no usable content")]
    EmptyResponse { provider: &'static str },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RagError>;

impl RagError {
    /// Maps a non-success HTTP status to the matching variant.
    pub fn from_status(provider: &'static str, status: u16, message: String) -> RagError {
        match status {
            401 | 403 => RagError::Authentication { provider, message },
            429 => RagError::RateLimited { provider, message },
            _ => RagError::Provider {
                provider,
                status,
                message,
            },
        }
    }
}

/// Pulls a human readable message out of a provider error body.
/// OpenAI nests it as `{"error": {"message": ..}}`, Exa sends `{"error": ".."}`.
pub fn provider_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| match v.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string()),
        None => v
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string()),
    });
    message.unwrap_or_else(|| body.trim().to_string())
}

#[test]
fn test_from_status_mapping() {
    assert!(matches!(
        RagError::from_status("exa", 401, "bad key".into()),
        RagError::Authentication { .. }
    ));
    assert!(matches!(
        RagError::from_status("openai", 403, "forbidden".into()),
        RagError::Authentication { .. }
    ));
    assert!(matches!(
        RagError::from_status("openai", 429, "slow down".into()),
        RagError::RateLimited { .. }
    ));
    assert!(matches!(
        RagError::from_status("exa", 500, "boom".into()),
        RagError::Provider { status: 500, .. }
    ));
}

#[test]
fn test_provider_message_shapes() {
    assert_eq!(
        provider_message(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#),
        "Incorrect API key provided"
    );
    assert_eq!(provider_message(r#"{"error": "Invalid API key"}"#), "Invalid API key");
    assert_eq!(provider_message(r#"{"message": "oops"}"#), "oops");
    assert_eq!(provider_message("  upstream timeout \n"), "upstream timeout");
}

#[test]
fn test_display_is_plain_text() {
    let err = RagError::from_status("openai", 401, "Incorrect API key provided".into());
    assert_eq!(
        err.to_string(),
        "openai authentication failed: Incorrect API key provided"
    );
}
