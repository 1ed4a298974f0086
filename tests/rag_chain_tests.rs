use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use web_rag::context::{format_context, format_source};
use web_rag::data_models::{ChatMessage, Role, SearchResult};
use web_rag::errors::{RagError, Result};
use web_rag::generator::{ChatModel, SYSTEM_PROMPT};
use web_rag::rag_chain::RagChain;
use web_rag::retriever::Retriever;
use web_rag::shell::{EMPTY_QUERY_WARNING, Shell, ShellState};

mod test_helpers {
    use super::*;

    pub struct FixedRetriever {
        pub results: Vec<SearchResult>,
        pub calls: AtomicUsize,
    }

    impl FixedRetriever {
        pub fn new(results: Vec<SearchResult>) -> Self {
            Self {
                results,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    pub struct FailingRetriever;

    #[async_trait]
    impl Retriever for FailingRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<SearchResult>> {
            Err(RagError::from_status("exa", 401, "Invalid API key".into()))
        }
    }

    /// Records every prompt it receives and answers with a fixed reply.
    pub struct RecordingModel {
        pub reply: std::result::Result<String, (u16, String)>,
        pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl RecordingModel {
        pub fn answering(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16, message: &str) -> Self {
            Self {
                reply: Err((status, message.to_string())),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err((status, message)) => {
                    Err(RagError::from_status("openai", *status, message.clone()))
                }
            }
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    pub fn sample_results(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| {
                SearchResult::new(
                    format!("https://example.com/{i}"),
                    vec![format!("highlight {i}a"), format!("highlight {i}b")],
                )
            })
            .collect()
    }

    /// The context block embedded between the <context> tags of the human message.
    pub fn embedded_context(messages: &[ChatMessage]) -> String {
        let human = &messages[1].content;
        let start = human.find("<context>\n").unwrap() + "<context>\n".len();
        let end = human.rfind("\n</context>").unwrap();
        human[start..end].to_string()
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_context_has_one_fragment_per_result_in_order() -> anyhow::Result<()> {
    for n in 0..=3 {
        let results = sample_results(n);
        let chain = RagChain::new(
            FixedRetriever::new(results.clone()),
            RecordingModel::answering("ok"),
        );
        chain.invoke("what is rust?").await?;

        let prompts = chain.model().prompts();
        assert_eq!(prompts.len(), 1);
        let context = embedded_context(&prompts[0]);

        assert_eq!(context.matches("<source>").count(), n);
        let expected: Vec<String> = results.iter().map(format_source).collect();
        assert_eq!(context, expected.join("\n"));

        // Sources appear in provider order.
        let mut last = 0;
        for r in &results {
            let pos = context.find(&r.url).unwrap();
            assert!(pos >= last);
            last = pos;
            for h in &r.highlights {
                assert!(context.contains(h.as_str()));
            }
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_zero_results_still_invokes_generator() -> anyhow::Result<()> {
    let chain = RagChain::new(
        FixedRetriever::new(vec![]),
        RecordingModel::answering("I could not find sources."),
    );
    let answer = chain.invoke("obscure question").await?;
    assert_eq!(answer, "I could not find sources.");

    let prompts = chain.model().prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(embedded_context(&prompts[0]), "");
    Ok(())
}

#[tokio::test]
async fn test_prompt_pair_shape() -> anyhow::Result<()> {
    let chain = RagChain::new(
        FixedRetriever::new(sample_results(1)),
        RecordingModel::answering("ok"),
    );
    chain.invoke("who wrote tokio?").await?;

    let prompt = &chain.model().prompts()[0];
    assert_eq!(prompt[0].role, Role::System);
    assert_eq!(prompt[0].content, SYSTEM_PROMPT);
    assert_eq!(prompt[1].role, Role::User);
    assert!(prompt[1].content.contains("\"Query: who wrote tokio?\n---\n"));
    assert!(prompt[1].content.contains("Please cite your sources"));
    Ok(())
}

#[tokio::test]
async fn test_retriever_error_skips_generator() {
    let chain = RagChain::new(FailingRetriever, RecordingModel::answering("unused"));
    let err = chain.invoke("anything").await.unwrap_err();
    assert!(matches!(err, RagError::Authentication { provider: "exa", .. }));
    assert!(chain.model().prompts().is_empty());
}

#[tokio::test]
async fn test_invoke_is_idempotent() -> anyhow::Result<()> {
    let chain = RagChain::new(
        FixedRetriever::new(sample_results(3)),
        RecordingModel::answering("# Answer\n\nSee [1]."),
    );
    let first = chain.invoke("same query").await?;
    let second = chain.invoke("same query").await?;
    assert_eq!(first, second);

    let prompts = chain.model().prompts();
    assert_eq!(prompts[0], prompts[1]);
    assert_eq!(chain.retriever().calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_shell_empty_query_never_reaches_pipeline() {
    let chain = RagChain::new(
        FixedRetriever::new(sample_results(2)),
        RecordingModel::answering("unused"),
    );

    let mut shell = Shell::new();
    let state = shell.submit(&chain, "").await;
    assert_eq!(
        state,
        &ShellState::Idle {
            warning: Some(EMPTY_QUERY_WARNING.to_string())
        }
    );
    assert_eq!(chain.retriever().calls.load(Ordering::SeqCst), 0);
    assert!(chain.model().prompts().is_empty());
}

#[tokio::test]
async fn test_shell_whitespace_query_is_submitted() {
    let chain = RagChain::new(
        FixedRetriever::new(sample_results(1)),
        RecordingModel::answering("answer for blanks"),
    );

    for query in ["   ", "\n\t"] {
        let mut shell = Shell::new();
        let state = shell.submit(&chain, query).await;
        assert_eq!(state, &ShellState::Resolved("answer for blanks".to_string()));
    }
    assert_eq!(chain.retriever().calls.load(Ordering::SeqCst), 2);

    let prompts = chain.model().prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0][1].content.contains("\"Query:    \n---\n"));
}

#[test]
fn test_outcome_of_each_state() {
    assert_eq!(
        ShellState::Resolved("42".into()).into_outcome(),
        Ok("42".to_string())
    );
    assert_eq!(
        ShellState::Failed("An error occurred: boom".into()).into_outcome(),
        Err("An error occurred: boom".to_string())
    );
    assert_eq!(
        ShellState::Idle {
            warning: Some(EMPTY_QUERY_WARNING.to_string())
        }
        .into_outcome(),
        Err(EMPTY_QUERY_WARNING.to_string())
    );
}

#[tokio::test]
async fn test_shell_resolves_with_exact_answer() {
    let reply = "Rust is a systems language.\n\n**Sources:** https://example.com/0";
    let chain = RagChain::new(
        FixedRetriever::new(sample_results(1)),
        RecordingModel::answering(reply),
    );

    let mut shell = Shell::new();
    assert_eq!(shell.state(), &ShellState::Idle { warning: None });
    shell.submit(&chain, "what is rust?").await;
    assert_eq!(shell.into_state(), ShellState::Resolved(reply.to_string()));
}

#[tokio::test]
async fn test_shell_fails_with_error_text() {
    let chain = RagChain::new(
        FixedRetriever::new(sample_results(1)),
        RecordingModel::failing(429, "Rate limit reached for requests"),
    );

    let mut shell = Shell::new();
    let state = shell.submit(&chain, "what is rust?").await.clone();
    match state {
        ShellState::Failed(message) => {
            assert_eq!(
                message,
                "An error occurred: openai rate limit exceeded: Rate limit reached for requests"
            );
            assert!(!message.contains("RateLimited"));
        }
        other => panic!("expected failed state, got {other:?}"),
    }
}

#[test]
fn test_format_context_separates_with_single_newline() {
    let results = sample_results(2);
    let context = format_context(&results);
    assert_eq!(
        context,
        format!("{}\n{}", format_source(&results[0]), format_source(&results[1]))
    );
    assert!(context.starts_with("\n<source>"));
    assert!(context.ends_with("</source>\n"));
}
