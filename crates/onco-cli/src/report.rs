use std::fmt::Write;

use onco_core::{GateOutcome, RunStatus, WorkflowRecord};

const RULE: &str = "══════════════════════════════════════════════════════════════════════";
const THIN: &str = "----------------------------------------------------------------------";

/// Banner-style clinical decision support report for one committed run.
pub fn render(record: &WorkflowRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "CLINICAL EVIDENCE WORKFLOW - session {}", record.session_id);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "Query          : {} ({} vs {}, {}-{})",
        record.query.cancer_type,
        record.query.treatment_arms.first().map(String::as_str).unwrap_or("?"),
        record.query.treatment_arms.get(1).map(String::as_str).unwrap_or("?"),
        record.query.min_year,
        record.query.max_year,
    );
    let _ = writeln!(
        out,
        "Status         : {}",
        match record.status {
            RunStatus::Complete => "complete",
            RunStatus::Incomplete => "incomplete",
        }
    );

    if let Some(evidence) = &record.evidence {
        let _ = writeln!(out, "\n{THIN}\nLITERATURE EVIDENCE\n{THIN}");
        let _ = writeln!(out, "Total papers   : {}", evidence.total_found);
        let _ = writeln!(out, "Source         : {:?}", evidence.source);
        for (i, paper) in evidence.records.iter().take(6).enumerate() {
            let _ = writeln!(out, "\n[{}] {}", i + 1, paper.title);
            let year = paper
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let _ = writeln!(out, "    {} | {} | id {}", paper.venue, year, paper.external_id);
            if !paper.authors.is_empty() {
                let mut authors = paper.authors[..paper.authors.len().min(3)].join(", ");
                if paper.authors.len() > 3 {
                    authors.push_str(" et al.");
                }
                let _ = writeln!(out, "    Authors: {authors}");
            }
        }
    }

    if let Some(survival) = &record.survival {
        let _ = writeln!(out, "\n{THIN}\nSTATISTICAL SURVIVAL ANALYSIS\n{THIN}");
        let _ = writeln!(out, "Log-rank chi2  : {:.4}", survival.test_statistic);
        let _ = writeln!(out, "p-value        : {:.4}", survival.p_value);
        for (arm, median) in &survival.median_survival_by_group {
            let median = median
                .map(|m| format!("{m:.1} months"))
                .unwrap_or_else(|| "not reached".to_string());
            let _ = writeln!(out, "Median ({arm}): {median}");
        }
        for (arm, (observed, expected)) in &survival.events_observed_vs_expected {
            let _ = writeln!(out, "O/E ({arm}): {observed:.0} observed vs {expected:.2} expected");
        }
    }

    if let Some(rec) = &record.recommendation {
        let _ = writeln!(out, "\n{RULE}\nCLINICAL DECISION SUPPORT REPORT\n{RULE}");
        let _ = writeln!(out, "Recommendation      : {}", rec.preferred_arm);
        let _ = writeln!(out, "Strength            : {:?} (GRADE {})", rec.strength, rec.grade);
        let _ = writeln!(out, "Confidence Score    : {:.1}%", rec.confidence * 100.0);
        let _ = writeln!(out, "Rationale           : {}", rec.rationale);
    }

    if let Some(gate) = &record.gate {
        let decision = match gate.outcome {
            GateOutcome::Approved => "APPROVED",
            GateOutcome::Modified => "MODIFIED",
            GateOutcome::Rejected => "REJECTED",
        };
        let _ = writeln!(out, "\nPhysician Review    : {decision}");
        let _ = writeln!(out, "Comment             : {}", gate.reviewer_comment);
    }

    if let Some(risk) = &record.risk {
        let _ = writeln!(
            out,
            "\nAdverse Event Risk  : any-grade {:.0}%, grade 3-4 {:.0}% ({})",
            risk.any_grade_rate * 100.0,
            risk.severe_grade_rate * 100.0,
            risk.treatment
        );
        let _ = writeln!(out, "Monitoring Advice   : {}", risk.monitoring_note);
    }

    if !record.warnings.is_empty() {
        let _ = writeln!(out, "\n{THIN}\nWARNINGS\n{THIN}");
        for warning in &record.warnings {
            let _ = writeln!(out, "- {warning}");
        }
    }

    let _ = writeln!(out, "{RULE}");
    out
}
