use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnswerResponse {
    Idle {
        warning: String,
    },
    Resolved {
        answer: String,
        processing_time_ms: u64,
    },
    Failed {
        error: String,
        processing_time_ms: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
