use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data_models::ChatMessage;
use crate::errors::{RagError, Result, provider_message};

const PROVIDER: &str = "openai";

pub const SYSTEM_PROMPT: &str = "You are an expert research assistant. You use xml-formatted context to research people's questions";

/// Builds the system + human prompt pair for one query.
pub fn build_messages(query: &str, context: &str) -> Vec<ChatMessage> {
    let human = format!(
        "\nPlease answer the following query based on the provided context. Please cite your sources at the end of the response:\n     \n\"Query: {query}\n---\n<context>\n{context}\n</context>\n"
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(human)]
}

/// A hosted chat model that answers a list of messages with plain text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    fn model(&self) -> &str;
}

/// OpenAI `/chat/completions` client. Decoding parameters are left to the provider.
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> OpenAiChat {
        OpenAiChat {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> OpenAiChat {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.openai_model.clone(),
        )
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        log::info!("requesting completion from {}", self.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("openai completion failed with {status}");
            return Err(RagError::from_status(
                PROVIDER,
                status.as_u16(),
                provider_message(&body),
            ));
        }

        let body: ChatCompletionResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(RagError::EmptyResponse { provider: PROVIDER })?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[test]
fn test_build_messages() {
    let messages = build_messages("what is tokio?", "<source>..</source>");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], ChatMessage::system(SYSTEM_PROMPT));
    assert_eq!(
        messages[1].content,
        "\nPlease answer the following query based on the provided context. Please cite your sources at the end of the response:\n     \n\"Query: what is tokio?\n---\n<context>\n<source>..</source>\n</context>\n"
    );
}

#[test]
fn test_build_messages_empty_context() {
    let messages = build_messages("q", "");
    assert!(messages[1].content.ends_with("<context>\n\n</context>\n"));
}

#[test]
fn test_request_has_no_decoding_overrides() {
    let messages = build_messages("q", "");
    let request = ChatCompletionRequest {
        model: "gpt-3.5-turbo",
        messages: &messages,
    };
    let value = serde_json::to_value(&request).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 2);
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["role"], "user");
}
