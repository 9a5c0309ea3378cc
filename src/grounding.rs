//! Local check that every clause's `original_text` really occurs in the
//! contract text.

use crate::{config::GroundingPolicy, schema::ContractAnalysis};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grounding {
    /// Verbatim substring of the source.
    Exact,
    /// Substring once both sides are NFKC-normalized and whitespace is collapsed.
    Normalized,
    Ungrounded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseGrounding {
    pub index: usize,
    pub clause_name: String,
    pub status: Grounding,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundingReport {
    pub checked: bool,
    pub clauses: Vec<ClauseGrounding>,
    pub dropped: usize,
}

impl GroundingReport {
    pub fn ungrounded(&self) -> impl Iterator<Item = &ClauseGrounding> {
        self.clauses
            .iter()
            .filter(|c| c.status == Grounding::Ungrounded)
    }

    pub fn all_grounded(&self) -> bool {
        self.ungrounded().next().is_none()
    }
}

fn normalize(s: &str) -> String {
    let nfkc: String = s.nfkc().collect();
    WHITESPACE.replace_all(nfkc.trim(), " ").into_owned()
}

/// Classify a single evidence excerpt against the source text.
pub fn locate(source: &str, excerpt: &str) -> Grounding {
    classify(source, &normalize(source), excerpt)
}

fn classify(source: &str, normalized_source: &str, excerpt: &str) -> Grounding {
    if excerpt.trim().is_empty() {
        return Grounding::Ungrounded;
    }
    if source.contains(excerpt) {
        return Grounding::Exact;
    }
    if normalized_source.contains(&normalize(excerpt)) {
        return Grounding::Normalized;
    }
    Grounding::Ungrounded
}

pub fn verify(source: &str, analysis: &ContractAnalysis) -> GroundingReport {
    // PDF text layers break lines mid-sentence; normalize the source once.
    let normalized_source = normalize(source);
    let clauses = analysis
        .high_risk_clauses
        .iter()
        .enumerate()
        .map(|(index, clause)| ClauseGrounding {
            index,
            clause_name: clause.clause_name.clone(),
            status: classify(source, &normalized_source, &clause.original_text),
        })
        .collect();

    GroundingReport {
        checked: true,
        clauses,
        dropped: 0,
    }
}

/// Verify `analysis` against `source` and enforce `policy`.
pub fn apply(
    policy: GroundingPolicy,
    source: &str,
    mut analysis: ContractAnalysis,
) -> (ContractAnalysis, GroundingReport) {
    if policy == GroundingPolicy::Off {
        return (analysis, GroundingReport::default());
    }

    let mut report = verify(source, &analysis);
    for c in report.ungrounded() {
        warn!(
            "clause {} ({:?}) evidence not found in contract text",
            c.index, c.clause_name
        );
    }

    if policy == GroundingPolicy::Drop {
        let before = analysis.high_risk_clauses.len();
        let mut statuses = report.clauses.iter().map(|c| c.status);
        analysis
            .high_risk_clauses
            .retain(|_| statuses.next() != Some(Grounding::Ungrounded));
        report.dropped = before - analysis.high_risk_clauses.len();
    }

    (analysis, report)
}
