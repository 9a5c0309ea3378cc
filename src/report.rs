use crate::{
    grounding::{Grounding, GroundingReport},
    schema::ContractAnalysis,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    pub path: String,
    pub file_bytes: u64,
    pub page_count: u32,
    pub text_chars: usize,
}

/// Everything produced for one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub input: InputInfo,
    pub model_id: String,
    pub grounding: GroundingReport,
    pub analysis: ContractAnalysis,
}

/// Render the report as the Markdown dashboard.
pub fn render_markdown(report: &AnalysisReport) -> String {
    let a = &report.analysis;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# Contract Risk Report\n");
    let _ = writeln!(out, "| Contract Type | Fairness Score | High-Risk Terms |");
    let _ = writeln!(out, "|---|---|---|");
    let _ = writeln!(
        out,
        "| {} | {}/100 | {} |\n",
        escape_cell(&a.contract_type),
        a.fairness_score,
        a.high_risk_clauses.len()
    );

    let _ = writeln!(out, "## Executive Summary\n");
    let _ = writeln!(out, "{}\n", a.overall_summary.trim());

    let _ = writeln!(out, "## Identified Risks\n");
    if a.high_risk_clauses.is_empty() {
        let _ = writeln!(out, "No high-risk clauses were found.\n");
    }
    for (i, clause) in a.high_risk_clauses.iter().enumerate() {
        let _ = writeln!(
            out,
            "### {} - Level: {}\n",
            clause.clause_name.trim(),
            clause.risk_level.trim()
        );
        let _ = writeln!(out, "{}\n", clause.summary.trim());
        let _ = writeln!(out, "**Evidence from text:**\n");
        let _ = writeln!(out, "{}\n", quote(&clause.original_text));
        if let Some(status) = clause_status(&report.grounding, i) {
            if status == Grounding::Ungrounded {
                let _ = writeln!(out, "_Evidence could not be located in the contract text._\n");
            }
        }
    }

    let _ = writeln!(out, "## Key Dates & Deadlines\n");
    if a.key_dates.is_empty() {
        let _ = writeln!(out, "No specific deadlines were identified.\n");
    } else {
        for date in &a.key_dates {
            let _ = writeln!(out, "- **{}**: {}", date.event.trim(), date.date_description.trim());
            if let Some(risk) = date.risk_summary.as_deref().filter(|r| !r.trim().is_empty()) {
                let _ = writeln!(out, "  - Note: {}", risk.trim());
            }
        }
        out.push('\n');
    }

    let g = &report.grounding;
    if g.checked {
        let _ = writeln!(out, "## Evidence Check\n");
        let ungrounded = g.ungrounded().count();
        let _ = writeln!(
            out,
            "{} of {} clauses located in the source text; {} ungrounded, {} dropped.\n",
            g.clauses.len() - ungrounded,
            g.clauses.len(),
            ungrounded,
            g.dropped
        );
    }

    let _ = writeln!(
        out,
        "---\n_Source: {} ({} pages, {} characters), model {}._",
        report.input.path, report.input.page_count, report.input.text_chars, report.model_id
    );
    out
}

// Grounding indexes refer to the clause list before any drop.
fn clause_status(g: &GroundingReport, index: usize) -> Option<Grounding> {
    if g.dropped > 0 {
        return None;
    }
    g.clauses.get(index).map(|c| c.status)
}

fn quote(s: &str) -> String {
    s.trim()
        .lines()
        .map(|l| format!("> {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_cell(s: &str) -> String {
    s.trim().replace('|', "\\|").replace('\n', " ")
}
