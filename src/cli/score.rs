// src/cli/score.rs — The `score` command: multi-pass batch scoring
//
// One initial pass over every scoreable dialogue, then up to retry_passes
// extra passes over whatever failed transiently, with a cooldown between
// passes. Anything still transient after the last pass is escalated to a
// permanent error and flagged for manual review.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};

use crate::core::types::ResultsDocument;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::judge::client::{JudgeClient, JudgeClientConfig};
use crate::judge::gemini::{GeminiJudge, SafetySettings};
use crate::judge::pacing::RequestPacer;
use crate::report::{print_report, RunSummary};
use crate::scoring::{escalate_to_permanent, Scorer};

pub async fn run_score(
    file: Option<PathBuf>,
    retry: bool,
    output: Option<PathBuf>,
    model: Option<String>,
    mut config: Config,
) -> anyhow::Result<()> {
    if let Some(model) = model {
        config.judge.model = model;
    }

    let input = match file {
        Some(path) => path,
        None => find_latest_results(&paths::results_dir())?,
    };
    println!("Scoring {}", input.display());

    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut doc: ResultsDocument = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", input.display()))?;

    let scorer = build_scorer(&config)?;
    println!("Judge model: {}", scorer.judge_id());

    // Select what to score. In retry mode only previously-transient records
    // get a fresh attempt; everything else keeps its existing result.
    let mut queue: Vec<usize> = Vec::new();
    let mut skipped = 0usize;
    for (i, record) in doc.results.iter_mut().enumerate() {
        if retry {
            if record.has_transient_error() {
                record.auto_scores = None;
                queue.push(i);
            }
            continue;
        }
        if record.is_complete() {
            queue.push(i);
        } else {
            skipped += 1;
            tracing::debug!(
                dialogue = %record.dialogue_id,
                "Skipping incomplete dialogue"
            );
        }
    }

    if retry && queue.is_empty() {
        println!("No retryable errors found; nothing to do");
        return Ok(());
    }
    if skipped > 0 {
        println!("Skipping {skipped} incomplete dialogues (upstream failures)");
    }
    println!("Queued {} dialogues for scoring\n", queue.len());

    let mut pacer = RequestPacer::new(config.pacing.clone());
    let out_path = output.unwrap_or_else(|| default_output_path(&input));

    score_pass(&scorer, &mut doc, &queue, &mut pacer).await;
    persist(&mut doc, scorer.judge_id(), &out_path)?;

    // Retry passes over whatever failed transiently.
    let retry_passes = config.retry.retry_passes;
    for pass in 1..=retry_passes {
        let pending: Vec<usize> = (0..doc.results.len())
            .filter(|&i| doc.results[i].has_transient_error())
            .collect();
        if pending.is_empty() {
            break;
        }
        let cooldown = config.retry_cooldown();
        println!(
            "\nRetry pass {pass}/{retry_passes}: {} dialogues, cooling down {}s first",
            pending.len(),
            cooldown.as_secs()
        );
        tokio::time::sleep(cooldown).await;
        for &i in &pending {
            doc.results[i].auto_scores = None;
        }
        score_pass(&scorer, &mut doc, &pending, &mut pacer).await;
        persist(&mut doc, scorer.judge_id(), &out_path)?;
    }

    // Out of passes: remaining transients become permanent, reviewed errors.
    for record in doc.results.iter_mut() {
        if record.has_transient_error() {
            if let Some(result) = record.auto_scores.as_mut() {
                escalate_to_permanent(result);
            }
        }
    }

    let summary = persist(&mut doc, scorer.judge_id(), &out_path)?;
    println!("\nSaved scored results to {}", out_path.display());

    print_report(&doc.results, &summary, retry_passes);
    Ok(())
}

/// Flush the full document to disk. Called at every pass boundary so a crash
/// loses at most the in-flight pass.
fn persist(
    doc: &mut ResultsDocument,
    model: &str,
    out_path: &Path,
) -> anyhow::Result<RunSummary> {
    let summary = RunSummary::from_records(&doc.results);
    stamp_metadata(doc, model, &summary);
    let serialized = serde_json::to_string_pretty(doc)?;
    std::fs::write(out_path, serialized)
        .with_context(|| format!("writing {}", out_path.display()))?;
    Ok(summary)
}

/// Score every queued record in order, pacing between requests.
async fn score_pass(
    scorer: &Scorer,
    doc: &mut ResultsDocument,
    queue: &[usize],
    pacer: &mut RequestPacer,
) {
    for (n, &i) in queue.iter().enumerate() {
        let record = &doc.results[i];
        println!(
            "  [{}/{}] {} ({})",
            n + 1,
            queue.len(),
            record.display_name(),
            record.dialogue_id
        );

        let result = scorer.score_dialogue(record).await;
        match (&result.error, result.is_transient) {
            (Some(e), true) => println!("      retryable error: {e}"),
            (Some(e), false) => println!("      permanent error: {e}"),
            (None, _) => println!(
                "      scored {}/12{}",
                result.total,
                if result.needs_review {
                    " (flagged)"
                } else {
                    ""
                }
            ),
        }
        pacer.record(result.is_error());
        doc.results[i].auto_scores = Some(result);

        if n + 1 < queue.len() {
            tokio::time::sleep(pacer.delay()).await;
        }
    }
}

fn build_scorer(config: &Config) -> anyhow::Result<Scorer> {
    let Some(api_key) = Config::api_key() else {
        bail!(
            "no judge API key found; set GOOGLE_API_KEY (or GEMINI_API_KEY) \
             in the environment"
        );
    };
    let judge = GeminiJudge::new(
        api_key,
        config.judge.model.clone(),
        SafetySettings::default(),
        config.request_timeout(),
    )?;
    let client = JudgeClient::new(Arc::new(judge), JudgeClientConfig::from_config(config));
    Ok(Scorer::new(client))
}

/// Newest gemini_results_*.json in the results directory, by mtime.
fn find_latest_results(dir: &Path) -> anyhow::Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading results directory {}", dir.display()))?;

    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("gemini_results_") || !name.ends_with(".json") {
            continue;
        }
        let mtime = entry.metadata()?.modified()?;
        if newest.as_ref().map(|(t, _)| mtime > *t).unwrap_or(true) {
            newest = Some((mtime, entry.path()));
        }
    }

    match newest {
        Some((_, path)) => Ok(path),
        None => bail!(
            "no gemini_results_*.json found in {}; pass a file explicitly",
            dir.display()
        ),
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let name = format!("scored_results_{stamp}.json");
    match input.parent() {
        Some(parent) if parent != Path::new("") => parent.join(name),
        _ => PathBuf::from(name),
    }
}

fn stamp_metadata(doc: &mut ResultsDocument, model: &str, summary: &RunSummary) {
    use serde_json::Value;
    let meta = &mut doc.metadata;
    meta.insert("auto_scored".into(), Value::Bool(true));
    meta.insert(
        "scoring_timestamp".into(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    meta.insert("scorer_model".into(), Value::String(model.to_string()));
    meta.insert("dialogues_scored".into(), Value::from(summary.scored));
    meta.insert(
        "dialogues_failed".into(),
        Value::from(summary.transient_errors + summary.permanent_errors),
    );
    meta.insert("dialogues_total".into(), Value::from(summary.total));
}
