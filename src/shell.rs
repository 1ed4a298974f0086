use crate::rag_chain::Answerer;

pub const EMPTY_QUERY_WARNING: &str = "Please enter a query to get an answer.";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellState {
    Idle { warning: Option<String> },
    Resolved(String),
    Failed(String),
}

impl ShellState {
    /// Answer text on success; the warning or error line otherwise.
    pub fn into_outcome(self) -> Result<String, String> {
        match self {
            ShellState::Resolved(answer) => Ok(answer),
            ShellState::Failed(error) => Err(error),
            ShellState::Idle { warning } => Err(warning.unwrap_or_default()),
        }
    }
}

/// One form submission: idle until a non-empty query is submitted, then resolved
/// or failed once the pipeline returns. The in-flight spinner belongs to the
/// page; `submit` has no cancellation.
#[derive(Debug)]
pub struct Shell {
    state: ShellState,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    pub fn new() -> Self {
        Self {
            state: ShellState::Idle { warning: None },
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn into_state(self) -> ShellState {
        self.state
    }

    pub async fn submit(&mut self, answerer: &dyn Answerer, query: &str) -> &ShellState {
        if query.is_empty() {
            self.state = ShellState::Idle {
                warning: Some(EMPTY_QUERY_WARNING.to_string()),
            };
            return &self.state;
        }

        self.state = match answerer.answer(query).await {
            Ok(answer) => ShellState::Resolved(answer),
            Err(e) => {
                log::error!("pipeline failed: {:#}", e);
                ShellState::Failed(format!("An error occurred: {}", e))
            }
        };
        &self.state
    }
}
