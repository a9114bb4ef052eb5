// Detection Module
// AI-likelihood estimation core organized into specialized submodules:
// - pattern_library: Versioned AI-leaning and human-leaning patterns
// - heuristic: Deterministic pattern scorer
// - blender: Confidence-weighted model/heuristic blending with explain trace
// - evidence_merger: Model/heuristic evidence union with per-granularity fallback
// - span_annotator: Non-overlapping highlight spans over the original text
// - markup: One-pass HTML rendering of spans
// - model_payload: Validation of raw model responses

pub mod error;
pub mod sensitivity;
pub mod pattern_library;
pub mod heuristic;
pub mod blender;
pub mod evidence_merger;
pub mod span_annotator;
pub mod markup;
pub mod model_payload;

// Re-export commonly used items
pub use error::DetectionError;
pub use sensitivity::Sensitivity;
pub use pattern_library::{Pattern, PatternLibrary, PATTERN_LIBRARY_VERSION};
pub use heuristic::{score_text, HeuristicScorer};
pub use blender::{
    blend,
    blend_or_fallback,
    blend_with_heuristic,
    blend_with_sensitivity,
    heuristic_only,
    heuristic_only_from,
    plan_weights,
    WeightInputs,
    WeightPlan,
};
pub use evidence_merger::{merge_evidence, merge_for_display, union_evidence};
pub use span_annotator::annotate;
pub use markup::{highlight_class, render_markup, render_markup_with};
pub use model_payload::{finish_reason_note, model_result_from_value, parse_model_payload};
