use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use web_rag::api::create_router;
use web_rag::config::{CONFIG, DEFAULT_BIND_ADDR, DEFAULT_STATIC_DIR};
use web_rag::rag_chain::{Answerer, RagChain};
use web_rag::shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "web-rag", about = "Answers questions from live web search results")]
struct Cli {
    /// Address the web UI listens on
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Directory holding index.html and friends
    #[arg(long, env = "STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    static_dir: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a single query in the terminal and exit
    Ask { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    // Bridge log crate -> tracing (so log::info! etc. work)
    tracing_log::LogTracer::init().context("failed to bridge log records")?;

    let cli = Cli::parse();
    let chain: Arc<dyn Answerer> = Arc::new(RagChain::from_config(&CONFIG));

    match cli.command {
        Some(Command::Ask { query }) => {
            let mut shell = Shell::new();
            shell.submit(chain.as_ref(), &query).await;
            // Non-zero exit with the message on stderr when there is no answer.
            let answer = shell.into_state().into_outcome().map_err(|e| anyhow!(e))?;
            println!("{answer}");
            Ok(())
        }
        None => serve(chain, &cli.bind, &cli.static_dir).await,
    }
}

async fn serve(chain: Arc<dyn Answerer>, bind: &str, static_dir: &str) -> anyhow::Result<()> {
    let app = create_router(chain, static_dir);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!("web rag chatbot listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
