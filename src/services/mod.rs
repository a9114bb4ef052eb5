// SlopDetect Core Services

pub mod config_store;
pub mod analysis_cache;
pub mod usage_stats;
pub mod detection;

pub use config_store::*;
pub use analysis_cache::AnalysisCache;
pub use usage_stats::UsageStats;

// Re-export detection entry points
pub use detection::{
    annotate,
    blend,
    blend_or_fallback,
    heuristic_only,
    merge_evidence,
    merge_for_display,
    parse_model_payload,
    render_markup,
    score_text,
    DetectionError,
    HeuristicScorer,
    PatternLibrary,
    Sensitivity,
};
