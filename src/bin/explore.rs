//! One-shot exploration of a local CSV or JSON file.
//!
//! Usage: `explore <file> [n_goals] [default|llm|columns]`
//!
//! Prints the summary and the goal report as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vizier::agents::AgentContext;
use vizier::data::DataTable;
use vizier::goals::GoalExplorer;
use vizier::summarize::{SummaryMethod, Summarizer};
use vizier::Config;

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vizier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: explore <file> [n_goals] [default|llm|columns]"))?;
    let n: usize = match args.next() {
        Some(raw) => raw.parse()?,
        None => 5,
    };
    let method: SummaryMethod = match args.next() {
        Some(raw) => raw.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => SummaryMethod::Default,
    };

    let config = Config::from_env()?;
    let ctx = AgentContext::from_config(&config);

    let table = DataTable::load(&path)?;
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = path
        .file_stem()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();

    let summary = Summarizer::new(&ctx)
        .summarize(&table, &name, &file_name, method, config.n_samples)
        .await?;
    let report = GoalExplorer::new(&ctx).generate(&summary, n, None).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "summary": summary, "goals": report }))?
    );
    Ok(())
}
