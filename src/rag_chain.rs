use async_trait::async_trait;

use crate::config::Config;
use crate::context::format_context;
use crate::errors::Result;
use crate::generator::{ChatModel, OpenAiChat, build_messages};
use crate::retriever::{ExaRetriever, Retriever};

/// Object-safe view of a pipeline, used by the presentation layer.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, query: &str) -> Result<String>;
}

/// retrieve -> format -> generate, one after the other.
pub struct RagChain<R, M> {
    retriever: R,
    model: M,
}

impl RagChain<ExaRetriever, OpenAiChat> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ExaRetriever::from_config(config),
            OpenAiChat::from_config(config),
        )
    }
}

impl<R, M> RagChain<R, M>
where
    R: Retriever,
    M: ChatModel,
{
    pub fn new(retriever: R, model: M) -> Self {
        Self { retriever, model }
    }

    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub async fn invoke(&self, query: &str) -> Result<String> {
        let results = self.retriever.retrieve(query).await?;

        // Zero results still go to the model with an empty context.
        let context = format_context(&results);
        log::info!(
            "built context from {} sources ({} bytes)",
            results.len(),
            context.len()
        );

        let messages = build_messages(query, &context);
        let answer = self.model.complete(&messages).await?;
        log::info!("received answer ({} bytes)", answer.len());
        Ok(answer)
    }
}

#[async_trait]
impl<R, M> Answerer for RagChain<R, M>
where
    R: Retriever,
    M: ChatModel,
{
    async fn answer(&self, query: &str) -> Result<String> {
        self.invoke(query).await
    }
}
