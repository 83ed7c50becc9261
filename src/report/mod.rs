// src/report/mod.rs — Run summary reporting
//
// Aggregates final results into per-outcome counts and a score histogram so
// an operator can tell "API is down" (many transient) from "judge is
// non-compliant" (many parse failures) from "content policy is blocking
// medical content" (many permanent).

use crate::core::types::DialogueRecord;

/// One of the four fixed histogram bins over total scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBin {
    pub label: &'static str,
    pub low: u8,
    pub high: u8,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub skipped_upstream: usize,
    pub scored: usize,
    pub transient_errors: usize,
    pub permanent_errors: usize,
    pub flagged: usize,
    pub auto_approved: usize,
    pub low_confidence: usize,
    pub average_score: f64,
    pub avg_with_misinfo: Option<f64>,
    pub avg_without_misinfo: Option<f64>,
    pub bins: [ScoreBin; 4],
}

impl RunSummary {
    /// Build the summary from the full record set, including records that
    /// were skipped because the upstream benchmark run failed.
    pub fn from_records(records: &[DialogueRecord]) -> Self {
        let mut summary = RunSummary {
            total: records.len(),
            bins: [
                ScoreBin { label: "10-12 (Excellent)", low: 10, high: 12, count: 0 },
                ScoreBin { label: "7-9 (Good)", low: 7, high: 9, count: 0 },
                ScoreBin { label: "4-6 (Fair)", low: 4, high: 6, count: 0 },
                ScoreBin { label: "0-3 (Poor)", low: 0, high: 3, count: 0 },
            ],
            ..Default::default()
        };

        let mut score_sum: u64 = 0;
        let mut misinfo_sum: u64 = 0;
        let mut misinfo_n: usize = 0;
        let mut clean_sum: u64 = 0;
        let mut clean_n: usize = 0;

        for record in records {
            let Some(result) = &record.auto_scores else {
                summary.skipped_upstream += 1;
                continue;
            };

            if result.is_error() {
                if result.is_transient {
                    summary.transient_errors += 1;
                } else {
                    summary.permanent_errors += 1;
                    summary.flagged += 1;
                }
                continue;
            }

            summary.scored += 1;
            score_sum += result.total as u64;

            if record.has_misinformation {
                misinfo_sum += result.total as u64;
                misinfo_n += 1;
            } else {
                clean_sum += result.total as u64;
                clean_n += 1;
            }

            if result.needs_review {
                summary.flagged += 1;
            } else {
                summary.auto_approved += 1;
            }

            if result.flags.iter().any(|f| f.starts_with("LOW_CONFIDENCE_")) {
                summary.low_confidence += 1;
            }

            for bin in summary.bins.iter_mut() {
                if result.total >= bin.low && result.total <= bin.high {
                    bin.count += 1;
                    break;
                }
            }
        }

        if summary.scored > 0 {
            summary.average_score = score_sum as f64 / summary.scored as f64;
        }
        if misinfo_n > 0 {
            summary.avg_with_misinfo = Some(misinfo_sum as f64 / misinfo_n as f64);
        }
        if clean_n > 0 {
            summary.avg_without_misinfo = Some(clean_sum as f64 / clean_n as f64);
        }

        summary
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Print the full run report.
pub fn print_report(records: &[DialogueRecord], summary: &RunSummary, retry_passes: u32) {
    println!();
    println!("{}", "=".repeat(70));
    println!("AUTO-SCORING COMPLETE");
    println!("{}", "=".repeat(70));

    if summary.skipped_upstream > 0 {
        println!(
            "\nSkipped {}/{} dialogues (upstream failure: missing responses)",
            summary.skipped_upstream, summary.total
        );
    }

    println!(
        "\nSuccessfully scored: {}/{} dialogues ({:.1}%)",
        summary.scored,
        summary.total,
        pct(summary.scored, summary.total)
    );
    if summary.transient_errors > 0 {
        println!(
            "Retryable errors (API issues): {} ({:.1}%)",
            summary.transient_errors,
            pct(summary.transient_errors, summary.total)
        );
    }
    if summary.permanent_errors > 0 {
        println!(
            "Permanent errors: {} ({:.1}%)",
            summary.permanent_errors,
            pct(summary.permanent_errors, summary.total)
        );
    }

    if summary.scored > 0 {
        println!("\nAverage score: {:.1}/12 (of scored dialogues)", summary.average_score);
        println!(
            "Flagged for manual review: {} ({:.1}% of scored)",
            summary.flagged,
            pct(summary.flagged, summary.scored)
        );
        println!(
            "Auto-approved: {} ({:.1}% of scored)",
            summary.auto_approved,
            pct(summary.auto_approved, summary.scored)
        );

        if let (Some(with), Some(without)) =
            (summary.avg_with_misinfo, summary.avg_without_misinfo)
        {
            println!("\nPerformance by test type:");
            println!("  With misinformation test:    {with:.1}/12 avg");
            println!("  Without misinformation test: {without:.1}/12 avg");
        }

        if summary.low_confidence > 0 {
            println!(
                "\nLow-confidence scores: {} dialogues ({:.1}%); judge was uncertain",
                summary.low_confidence,
                pct(summary.low_confidence, summary.scored)
            );
        }

        println!("\nScore distribution:");
        for bin in &summary.bins {
            let p = pct(bin.count, summary.scored);
            let bar = "#".repeat((p / 2.0) as usize);
            println!("  {:20} {:4} ({:5.1}%) {}", bin.label, bin.count, p, bar);
        }
    }

    print_flagged(records);
    print_transient(records);
    print_next_steps(summary, retry_passes);
}

fn print_flagged(records: &[DialogueRecord]) {
    let flagged: Vec<(&DialogueRecord, &crate::core::types::ScoreResult)> = records
        .iter()
        .filter_map(|r| r.auto_scores.as_ref().map(|s| (r, s)))
        .filter(|(_, s)| s.needs_review)
        .collect();

    if flagged.is_empty() {
        return;
    }

    println!("\nFlagged for manual review:");
    for (record, scores) in flagged {
        println!(
            "  {:30} score {:2}/12  [{}]",
            record.display_name(),
            scores.total,
            scores.flags.join(", ")
        );
    }
}

fn print_transient(records: &[DialogueRecord]) {
    let transient: Vec<&DialogueRecord> = records
        .iter()
        .filter(|r| r.has_transient_error())
        .collect();

    if transient.is_empty() {
        return;
    }

    println!("\nRetryable errors (API overload / rate limit):");
    for record in transient {
        println!("  {}", record.display_name());
    }
}

fn print_next_steps(summary: &RunSummary, retry_passes: u32) {
    println!("\n{}", "=".repeat(70));
    println!("NEXT STEPS");
    println!("{}", "=".repeat(70));

    if summary.skipped_upstream > 0 {
        println!(
            "  {} dialogues never completed upstream; fix the benchmark run and re-run it",
            summary.skipped_upstream
        );
    }
    if summary.transient_errors > 0 {
        println!(
            "  {} dialogues still failing after {} retry passes; the API may be overloaded:",
            summary.transient_errors, retry_passes
        );
        println!("    - wait and retry:        dermbench score --retry <scored file>");
        println!("    - more passes:           export DERMBENCH_RETRY_PASSES=3");
        println!("    - longer cooldown:       export DERMBENCH_RETRY_COOLDOWN_SECS=60");
    }
    if summary.permanent_errors > 0 {
        println!(
            "  {} permanent errors; check the API key, model name, and safety settings",
            summary.permanent_errors
        );
    }
    if summary.flagged > summary.permanent_errors {
        println!(
            "  {} dialogues flagged; review them and override scores where needed",
            summary.flagged
        );
    }
    if summary.transient_errors == 0
        && summary.flagged == 0
        && summary.skipped_upstream == 0
        && summary.scored > 0
    {
        println!("  All {} dialogues auto-approved; no manual review needed", summary.scored);
    }
}
