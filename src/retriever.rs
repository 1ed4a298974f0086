use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data_models::SearchResult;
use crate::errors::{RagError, Result, provider_message};

pub const DEFAULT_NUM_RESULTS: usize = 3;
const PROVIDER: &str = "exa";

/// Turns a query into ranked search results.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Exa `/search` client with highlight extraction turned on.
pub struct ExaRetriever {
    client: Client,
    api_key: String,
    base_url: String,
    num_results: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
struct ExaContents {
    highlights: bool,
}

#[derive(Debug, Deserialize)]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
struct ExaResult {
    url: String,
    title: Option<String>,
    highlights: Option<Vec<String>>,
}

impl From<ExaResult> for SearchResult {
    fn from(r: ExaResult) -> Self {
        SearchResult {
            url: r.url,
            title: r.title,
            highlights: r.highlights.unwrap_or_default(),
        }
    }
}

impl ExaRetriever {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> ExaRetriever {
        ExaRetriever {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    pub fn from_config(config: &Config) -> ExaRetriever {
        Self::new(config.exa_api_key.clone(), config.exa_base_url.clone())
    }

    pub fn with_num_results(mut self, num_results: usize) -> ExaRetriever {
        self.num_results = num_results;
        self
    }

    pub fn num_results(&self) -> usize {
        self.num_results
    }
}

#[async_trait]
impl Retriever for ExaRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.base_url);
        let request = ExaSearchRequest {
            query,
            num_results: self.num_results,
            contents: ExaContents { highlights: true },
        };

        log::info!("searching exa, num_results: {}", self.num_results);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("exa search failed with {status}");
            return Err(RagError::from_status(
                PROVIDER,
                status.as_u16(),
                provider_message(&body),
            ));
        }

        let body: ExaSearchResponse = response.json().await?;
        let results: Vec<SearchResult> = body
            .results
            .into_iter()
            .take(self.num_results)
            .map(SearchResult::from)
            .collect();

        log::info!("exa returned {} results", results.len());
        Ok(results)
    }
}

#[test]
fn test_request_body_shape() {
    let request = ExaSearchRequest {
        query: "rust async runtimes",
        num_results: 3,
        contents: ExaContents { highlights: true },
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "query": "rust async runtimes",
            "numResults": 3,
            "contents": { "highlights": true }
        })
    );
}

#[test]
fn test_result_with_null_fields_decodes() {
    let body = r#"{"results": [{"url": "https://a.example", "title": null, "highlights": null, "score": 0.4}]}"#;
    let parsed: ExaSearchResponse = serde_json::from_str(body).unwrap();
    let results: Vec<SearchResult> = parsed.results.into_iter().map(SearchResult::from).collect();
    assert_eq!(results, vec![SearchResult::new("https://a.example", vec![])]);
}
