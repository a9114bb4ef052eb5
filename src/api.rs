// Request-level API
// Composes payload parsing, blending, evidence merging and annotation for one text.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::models::{AnalysisMode, BlendedResult, CategorizedEvidence, Span};
use crate::services::detection::{
    annotate, blend_or_fallback, finish_reason_note, heuristic_only, merge_for_display, parse_model_payload,
    render_markup_with, Sensitivity,
};
use crate::services::{AnalysisCache, DetectionConfig, UsageStats};

const NO_MODEL_NOTE: &str = "No model result supplied; used heuristic estimator.";

/// Everything a display layer needs for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub result: BlendedResult,
    /// Evidence the spans were computed from.
    pub evidence: CategorizedEvidence,
    pub spans: Vec<Span>,
}

/// Analyze `text`, blending in the raw model response when one is given.
///
/// Missing, blank, unparseable or invalid payloads all degrade to heuristic-only
/// output with an explanatory note; this never fails.
pub fn analyze_text(text: &str, model_payload: Option<&str>, sensitivity: Sensitivity) -> AnalysisReport {
    build_report(text, score_payload(text, model_payload, sensitivity), true)
}

/// Analyze `text` when the model finished without returning any text.
pub fn analyze_without_model_text(text: &str, finish_reason: &str, sensitivity: Sensitivity) -> AnalysisReport {
    build_report(text, no_text_result(text, finish_reason, sensitivity), true)
}

fn score_payload(text: &str, model_payload: Option<&str>, sensitivity: Sensitivity) -> BlendedResult {
    match model_payload.map(str::trim) {
        None => heuristic_only(text, NO_MODEL_NOTE, sensitivity),
        Some("") => no_text_result(text, "STOP", sensitivity),
        Some(raw) => match parse_model_payload(raw) {
            Ok(model) => blend_or_fallback(text, &model, sensitivity),
            Err(e) => {
                warn!("[API] model payload rejected: {}", e);
                heuristic_only(text, &format!("Used heuristic estimator: {}", e), sensitivity)
            }
        },
    }
}

fn no_text_result(text: &str, finish_reason: &str, sensitivity: Sensitivity) -> BlendedResult {
    let note = format!("Used heuristic estimator: {}", finish_reason_note(finish_reason));
    warn!("[API] model returned no text ({})", finish_reason);
    heuristic_only(text, &note, sensitivity)
}

/// Without `highlight` the evidence is still reported but no spans are computed.
fn build_report(text: &str, result: BlendedResult, highlight: bool) -> AnalysisReport {
    let t0 = Instant::now();
    let evidence = merge_for_display(&result);
    let spans = if highlight { annotate(text, &evidence) } else { Vec::new() };
    info!(
        mode = ?result.mode,
        ai_score = result.ai_score,
        confidence = result.confidence,
        spans = spans.len(),
        annotate_ms = t0.elapsed().as_millis() as u64,
        "analysis.done"
    );
    AnalysisReport { result, evidence, spans }
}

/// Caller-side state around the stateless core: settings, a per-item cache and
/// usage totals.
pub struct DetectionSession {
    config: DetectionConfig,
    cache: AnalysisCache<AnalysisReport>,
    stats: UsageStats,
}

impl DetectionSession {
    pub fn new(config: DetectionConfig) -> Self {
        let cache = AnalysisCache::new(config.cache_capacity);
        Self {
            config,
            cache,
            stats: UsageStats::default(),
        }
    }

    /// Continue from previously persisted totals.
    pub fn with_stats(mut self, stats: UsageStats) -> Self {
        self.stats = stats;
        self
    }

    /// Cached report for `item_id` if present, otherwise a fresh analysis.
    /// Only fresh analyses are counted in the stats.
    pub fn analyze(&mut self, item_id: &str, text: &str, model_payload: Option<&str>) -> AnalysisReport {
        if let Some(report) = self.cache.get(item_id) {
            info!(item_id, "analysis.cache_hit");
            return report.clone();
        }

        let result = score_payload(text, model_payload, self.config.sensitivity);
        let report = build_report(text, result, self.config.auto_highlight);
        if self.config.collect_stats {
            self.stats.record(report.result.ai_score);
        }
        self.cache.insert(item_id, report.clone());
        report
    }

    /// Markup for a report, with tooltips when the settings ask for them.
    pub fn render(&self, text: &str, report: &AnalysisReport) -> String {
        render_markup_with(text, &report.spans, self.config.show_tooltips)
    }

    /// Drop a cached report so the next call re-analyzes.
    pub fn forget(&mut self, item_id: &str) -> bool {
        self.cache.remove(item_id).is_some()
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn stats(&self) -> &UsageStats {
        &self.stats
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn is_blended(report: &AnalysisReport) -> bool {
        report.result.mode == AnalysisMode::Blended
    }
}
