// SlopDetect Data Models
// Value types shared by the scorer, blender, merger and annotator

use serde::{Deserialize, Serialize};

// ============ Evidence ============

/// Which way a piece of evidence leans.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Ai,
    Human,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::Human => "HUMAN",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Word,
    Line,
}

/// A token or phrase that pushed the estimate one way.
/// Tokens keep their original casing; comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub token: String,
    pub reason: String,
    pub category: Category,
    pub granularity: Granularity,
}

impl EvidenceItem {
    /// Returns `None` when the token is blank after trimming.
    pub fn new(
        token: impl Into<String>,
        reason: impl Into<String>,
        category: Category,
        granularity: Granularity,
    ) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self {
            token,
            reason: reason.into(),
            category,
            granularity,
        })
    }

    /// Case-insensitive dedup key.
    pub fn key(&self) -> String {
        self.token.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceBuckets {
    #[serde(default)]
    pub words: Vec<EvidenceItem>,
    #[serde(default)]
    pub lines: Vec<EvidenceItem>,
}

impl EvidenceBuckets {
    pub fn len(&self) -> usize {
        self.words.len() + self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.lines.is_empty()
    }

    pub fn get(&self, granularity: Granularity) -> &[EvidenceItem] {
        match granularity {
            Granularity::Word => &self.words,
            Granularity::Line => &self.lines,
        }
    }
}

/// Evidence split by category, the annotator's input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedEvidence {
    pub ai: EvidenceBuckets,
    pub human: EvidenceBuckets,
}

impl CategorizedEvidence {
    pub fn get(&self, category: Category) -> &EvidenceBuckets {
        match category {
            Category::Ai => &self.ai,
            Category::Human => &self.human,
        }
    }
}

// ============ Heuristic ============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicResult {
    /// 0..=100, higher means more AI-like.
    pub score: i32,
    /// 0..=100
    pub confidence: i32,
    /// Reason codes, heaviest first, each listed once.
    pub reasons: Vec<String>,
    pub ai_evidence: EvidenceBuckets,
    pub human_evidence: EvidenceBuckets,
}

// ============ Model ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAnalysis {
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub patterns: String,
    #[serde(default)]
    pub content: String,
}

/// Judgment supplied by the external model. Untrusted until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResult {
    pub ai_score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub suspicious_words: Vec<EvidenceItem>,
    #[serde(default)]
    pub suspicious_lines: Vec<EvidenceItem>,
    #[serde(default)]
    pub analysis: ModelAnalysis,
    #[serde(default)]
    pub reasoning: String,
}

impl ModelResult {
    pub fn evidence_count(&self) -> usize {
        self.suspicious_words.len() + self.suspicious_lines.len()
    }
}

// ============ Blend ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Blended,
    HeuristicOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelTrace {
    pub score: f64,
    pub confidence: f64,
    pub evidence_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicTrace {
    pub score: i32,
    pub confidence: i32,
    pub reasons: Vec<String>,
    pub ai_evidence: EvidenceBuckets,
    pub human_evidence: EvidenceBuckets,
}

impl From<&HeuristicResult> for HeuristicTrace {
    fn from(heur: &HeuristicResult) -> Self {
        Self {
            score: heur.score,
            confidence: heur.confidence,
            reasons: heur.reasons.clone(),
            ai_evidence: heur.ai_evidence.clone(),
            human_evidence: heur.human_evidence.clone(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub model: f64,
    pub heuristic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendTrace {
    pub blended: i32,
    /// Rounded to two decimals.
    pub weights: BlendWeights,
    pub disagreement: f64,
}

/// How the final numbers were reached. Built once per blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainTrace {
    /// Absent when the model contribution was discarded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelTrace>,
    pub heuristic: HeuristicTrace,
    pub blend: BlendTrace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedResult {
    pub ai_score: i32,
    pub confidence: i32,
    pub suspicious_words: Vec<EvidenceItem>,
    pub suspicious_lines: Vec<EvidenceItem>,
    pub analysis: ModelAnalysis,
    pub reasoning: String,
    pub mode: AnalysisMode,
    pub explain: ExplainTrace,
}

// ============ Annotation ============

/// Highlight range over the analyzed text, in both byte and character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// UTF-8 byte offset (0-based) into the analyzed text.
    pub start: usize,
    /// UTF-8 byte offset (0-based, end-exclusive) into the analyzed text.
    pub end: usize,
    /// Character (Unicode scalar) offset of `start`, for char-indexed display layers.
    pub char_start: usize,
    /// Character offset of `end`, end-exclusive.
    pub char_end: usize,
    pub category: Category,
    pub granularity: Granularity,
    pub reason: String,
}

impl Span {
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}
