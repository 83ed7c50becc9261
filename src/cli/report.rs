// src/cli/report.rs — The `report` command: summarize an existing scored file

use std::path::Path;

use anyhow::Context;

use crate::core::types::ResultsDocument;
use crate::infra::config::Config;
use crate::report::{print_report, RunSummary};

pub fn run_report(file: &Path, config: &Config) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let doc: ResultsDocument = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", file.display()))?;

    if let Some(model) = doc.metadata.get("scorer_model").and_then(|v| v.as_str()) {
        println!("Scored by {model}");
    }
    if let Some(ts) = doc
        .metadata
        .get("scoring_timestamp")
        .and_then(|v| v.as_str())
    {
        println!("Scored at {ts}");
    }

    let summary = RunSummary::from_records(&doc.results);
    print_report(&doc.results, &summary, config.retry.retry_passes);
    Ok(())
}
