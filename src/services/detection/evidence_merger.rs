// Evidence Merger
// Combines model and heuristic evidence into per-category word/line lists.

use std::collections::HashSet;

use crate::models::{BlendedResult, CategorizedEvidence, EvidenceBuckets, EvidenceItem, HeuristicResult, ModelResult};

/// Model evidence first. An empty model list is replaced by the heuristic list of
/// the same granularity; human evidence always comes from the heuristic.
pub fn merge_evidence(model: &ModelResult, heur: &HeuristicResult) -> CategorizedEvidence {
    CategorizedEvidence {
        ai: EvidenceBuckets {
            words: prefer_non_empty(&model.suspicious_words, &heur.ai_evidence.words),
            lines: prefer_non_empty(&model.suspicious_lines, &heur.ai_evidence.lines),
        },
        human: heur.human_evidence.clone(),
    }
}

/// Evidence for highlighting a finished result: model items followed by any
/// heuristic items the model did not already name.
pub fn merge_for_display(result: &BlendedResult) -> CategorizedEvidence {
    let heur = &result.explain.heuristic;
    CategorizedEvidence {
        ai: EvidenceBuckets {
            words: union_evidence(&result.suspicious_words, &heur.ai_evidence.words),
            lines: union_evidence(&result.suspicious_lines, &heur.ai_evidence.lines),
        },
        human: EvidenceBuckets {
            words: union_evidence(&heur.human_evidence.words, &[]),
            lines: union_evidence(&heur.human_evidence.lines, &[]),
        },
    }
}

/// Case-insensitive union; the first occurrence of a token wins and order is kept.
pub fn union_evidence(primary: &[EvidenceItem], secondary: &[EvidenceItem]) -> Vec<EvidenceItem> {
    let mut seen = HashSet::new();
    primary
        .iter()
        .chain(secondary)
        .filter(|item| seen.insert(item.key()))
        .cloned()
        .collect()
}

fn prefer_non_empty(primary: &[EvidenceItem], fallback: &[EvidenceItem]) -> Vec<EvidenceItem> {
    if primary.is_empty() {
        fallback.to_vec()
    } else {
        primary.to_vec()
    }
}
