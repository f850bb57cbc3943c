use pdfunlock_batch::{BatchOutcome, FileOutcome};

/// One line per file, then a totals line
pub fn summary(outcome: &BatchOutcome) -> String {
    let mut lines: Vec<String> = outcome
        .reports
        .iter()
        .map(|report| match &report.outcome {
            FileOutcome::Unlocked { artifact, size } => {
                format!("OK      {} -> {} ({} bytes)", report.name, artifact, size)
            }
            FileOutcome::Failed(reason) => format!("FAILED  {}: {}", report.name, reason),
        })
        .collect();
    lines.push(format!(
        "{} of {} file(s) unlocked",
        outcome.succeeded(),
        outcome.len()
    ));
    lines.join("\n")
}
