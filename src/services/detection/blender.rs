// Score Blender
// Merges the external model's judgment with the heuristic judgment into one
// calibrated result, weighted by confidence and mutual disagreement.
//
// The weighting steps are fixed; results must stay reproducible across versions.

use tracing::{debug, warn};

use crate::models::{
    AnalysisMode, BlendTrace, BlendWeights, BlendedResult, ExplainTrace, HeuristicResult, HeuristicTrace,
    ModelAnalysis, ModelResult, ModelTrace,
};

use super::error::DetectionError;
use super::heuristic::score_text;
use super::sensitivity::Sensitivity;

const MIN_BASE_WEIGHT: f64 = 0.15;
const MAX_BASE_WEIGHT: f64 = 0.85;
/// Fewer model highlights than this counts as weak evidence.
const WEAK_EVIDENCE_BELOW: usize = 2;
const MID_RANGE_LOW: f64 = 30.0;
const MID_RANGE_HIGH: f64 = 55.0;
const WEAK_EVIDENCE_SHIFT: f64 = 0.15;
const DISAGREEMENT_THRESHOLD: f64 = 20.0;
const MAX_DISAGREEMENT_ADJUST: f64 = 0.2;
/// The blend never claims near-zero or near-total certainty.
const MIN_CONFIDENCE: f64 = 10.0;
const MAX_CONFIDENCE: f64 = 95.0;

/// Numbers the weighting depends on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WeightInputs {
    pub model_score: f64,
    pub model_confidence: f64,
    pub model_evidence: usize,
    pub heuristic_score: f64,
    pub heuristic_confidence: f64,
}

/// Every intermediate stage of the weighting, for tracing and tests.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WeightPlan {
    pub disagreement: f64,
    /// Confidence-derived weights, clamped.
    pub base: BlendWeights,
    /// After the mid-range weak-evidence shift.
    pub after_evidence_shift: BlendWeights,
    /// After the disagreement correction.
    pub adjusted: BlendWeights,
    /// Sums to 1.
    pub normalized: BlendWeights,
    pub weak_evidence_applied: bool,
    pub disagreement_applied: bool,
}

pub fn plan_weights(inputs: &WeightInputs) -> WeightPlan {
    let weak_evidence = inputs.model_evidence < WEAK_EVIDENCE_BELOW;
    let disagreement = (inputs.model_score - inputs.heuristic_score).abs();

    let base = BlendWeights {
        model: (inputs.model_confidence / 100.0).clamp(MIN_BASE_WEIGHT, MAX_BASE_WEIGHT),
        heuristic: (inputs.heuristic_confidence / 100.0).clamp(MIN_BASE_WEIGHT, MAX_BASE_WEIGHT),
    };

    // A non-committal model without highlights gives way to the heuristic.
    let mut m_w = base.model;
    let mut h_w = base.heuristic;
    let model_mid = (MID_RANGE_LOW..=MID_RANGE_HIGH).contains(&inputs.model_score);
    let weak_evidence_applied = weak_evidence && model_mid;
    if weak_evidence_applied {
        h_w += WEAK_EVIDENCE_SHIFT;
        m_w -= WEAK_EVIDENCE_SHIFT;
    }
    let after_evidence_shift = BlendWeights { model: m_w, heuristic: h_w };

    // Strong disagreement pulls both weights toward their mean.
    let disagreement_applied = disagreement >= DISAGREEMENT_THRESHOLD;
    if disagreement_applied {
        let adj = MAX_DISAGREEMENT_ADJUST.min((disagreement - DISAGREEMENT_THRESHOLD) / 100.0);
        let avg = (m_w + h_w) / 2.0;
        m_w = avg - adj / 2.0;
        h_w = avg + adj / 2.0;
    }
    let adjusted = BlendWeights { model: m_w, heuristic: h_w };

    let sum = m_w + h_w;
    let normalized = BlendWeights {
        model: m_w / sum,
        heuristic: h_w / sum,
    };

    WeightPlan {
        disagreement,
        base,
        after_evidence_shift,
        adjusted,
        normalized,
        weak_evidence_applied,
        disagreement_applied,
    }
}

/// Blend with the built-in pattern library at default sensitivity.
pub fn blend(text: &str, model: &ModelResult) -> Result<BlendedResult, DetectionError> {
    blend_with_sensitivity(text, model, Sensitivity::default())
}

pub fn blend_with_sensitivity(
    text: &str,
    model: &ModelResult,
    sensitivity: Sensitivity,
) -> Result<BlendedResult, DetectionError> {
    // Validate before doing any heuristic work.
    validated_scores(model)?;
    blend_with_heuristic(model, score_text(text, sensitivity))
}

/// Blend against an already computed heuristic result.
pub fn blend_with_heuristic(model: &ModelResult, heur: HeuristicResult) -> Result<BlendedResult, DetectionError> {
    let (model_score, model_confidence) = validated_scores(model)?;
    let model_evidence = model.evidence_count();

    let plan = plan_weights(&WeightInputs {
        model_score,
        model_confidence,
        model_evidence,
        heuristic_score: heur.score as f64,
        heuristic_confidence: heur.confidence as f64,
    });
    let wm = plan.normalized.model;
    let wh = plan.normalized.heuristic;

    let blended = (wm * model_score + wh * heur.score as f64).clamp(0.0, 100.0).round() as i32;
    let confidence = (model_confidence * wm + heur.confidence as f64 * wh)
        .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
        .round() as i32;

    debug!(
        "[BLEND] model={:.0}/{:.0} heuristic={}/{} evidence={} disagreement={:.0} weights={:.2}/{:.2} weak_shift={} disagreement_shift={} -> {}/{}",
        model_score,
        model_confidence,
        heur.score,
        heur.confidence,
        model_evidence,
        plan.disagreement,
        wm,
        wh,
        plan.weak_evidence_applied,
        plan.disagreement_applied,
        blended,
        confidence
    );

    let explain = ExplainTrace {
        model: Some(ModelTrace {
            score: model_score,
            confidence: model_confidence,
            evidence_count: model_evidence,
        }),
        heuristic: HeuristicTrace::from(&heur),
        blend: BlendTrace {
            blended,
            weights: BlendWeights {
                model: round2(wm),
                heuristic: round2(wh),
            },
            disagreement: plan.disagreement,
        },
    };

    Ok(BlendedResult {
        ai_score: blended,
        confidence,
        suspicious_words: model.suspicious_words.clone(),
        suspicious_lines: model.suspicious_lines.clone(),
        analysis: model.analysis.clone(),
        reasoning: model.reasoning.clone(),
        mode: AnalysisMode::Blended,
        explain,
    })
}

/// Heuristic-only result for when the model contribution is unavailable or discarded.
/// `note` takes the place of the model's reasoning.
pub fn heuristic_only(text: &str, note: &str, sensitivity: Sensitivity) -> BlendedResult {
    heuristic_only_from(score_text(text, sensitivity), note)
}

pub fn heuristic_only_from(heur: HeuristicResult, note: &str) -> BlendedResult {
    let patterns = if heur.reasons.is_empty() {
        "N/A".to_string()
    } else {
        heur.reasons.join(", ")
    };

    BlendedResult {
        ai_score: heur.score,
        confidence: heur.confidence,
        suspicious_words: heur.ai_evidence.words.clone(),
        suspicious_lines: heur.ai_evidence.lines.clone(),
        analysis: ModelAnalysis {
            tone: "Heuristic fallback used; model contribution discarded".to_string(),
            patterns,
            content: "Model result unavailable".to_string(),
        },
        reasoning: note.to_string(),
        mode: AnalysisMode::HeuristicOnly,
        explain: ExplainTrace {
            model: None,
            heuristic: HeuristicTrace::from(&heur),
            blend: BlendTrace {
                blended: heur.score,
                weights: BlendWeights {
                    model: 0.0,
                    heuristic: 1.0,
                },
                disagreement: 0.0,
            },
        },
    }
}

/// Blend, or fall back to heuristic-only output when the model result is invalid.
pub fn blend_or_fallback(text: &str, model: &ModelResult, sensitivity: Sensitivity) -> BlendedResult {
    let heur = score_text(text, sensitivity);
    match blend_with_heuristic(model, heur.clone()) {
        Ok(result) => result,
        Err(e) => {
            warn!("[BLEND] discarding model contribution: {}", e);
            heuristic_only_from(heur, &format!("Used heuristic estimator: {}", e))
        }
    }
}

/// Finite scores rounded to whole points and clamped into [0, 100].
fn validated_scores(model: &ModelResult) -> Result<(f64, f64), DetectionError> {
    if !model.ai_score.is_finite() {
        return Err(DetectionError::invalid("aiScore", "is not a finite number"));
    }
    if !model.confidence.is_finite() {
        return Err(DetectionError::invalid("confidence", "is not a finite number"));
    }
    Ok((
        model.ai_score.round().clamp(0.0, 100.0),
        model.confidence.round().clamp(0.0, 100.0),
    ))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
