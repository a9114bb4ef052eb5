// Heuristic Scorer
// Scans text against the pattern library and produces a score, confidence
// and categorized evidence. Pure function of the text; no failure modes.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{Category, EvidenceBuckets, EvidenceItem, Granularity, HeuristicResult};

use super::pattern_library::PatternLibrary;
use super::sensitivity::Sensitivity;

/// Score of a text with no matches at all.
const BASE_SCORE: f64 = 35.0;
/// Score points per unit of net (AI - human) pattern weight.
const POINTS_PER_WEIGHT: f64 = 12.0;
/// Confidence with no evidence either way.
const BASE_CONFIDENCE: f64 = 30.0;
/// Confidence headroom reachable through evidence volume.
const CONFIDENCE_SPAN: f64 = 60.0;
/// Evidence count at which ~63% of the headroom is reached.
const VOLUME_SCALE: f64 = 4.0;
/// How much perfect AI/human parity removes from the volume gain.
const PARITY_PENALTY: f64 = 0.6;
/// Repeated hits of one pattern stop adding weight after this many.
const MAX_COUNTED_HITS: usize = 3;

pub struct HeuristicScorer<'a> {
    library: &'a PatternLibrary,
    sensitivity: Sensitivity,
}

impl Default for HeuristicScorer<'static> {
    fn default() -> Self {
        Self::new(PatternLibrary::builtin())
    }
}

impl<'a> HeuristicScorer<'a> {
    pub fn new(library: &'a PatternLibrary) -> Self {
        Self {
            library,
            sensitivity: Sensitivity::default(),
        }
    }

    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Score `text`. Unmatched or blank text yields a low, neutral result.
    pub fn score(&self, text: &str) -> HeuristicResult {
        if text.trim().is_empty() {
            return neutral_result();
        }

        let multiplier = self.sensitivity.multiplier();
        let units = sentence_units(text);

        let mut ai_weight = 0.0;
        let mut human_weight = 0.0;
        let mut reason_weights: Vec<(String, f64)> = Vec::new();
        let mut ai_evidence = EvidenceBuckets::default();
        let mut human_evidence = EvidenceBuckets::default();
        let mut seen: HashSet<(Category, Granularity, String)> = HashSet::new();

        for pattern in self.library.patterns() {
            let matches: Vec<&str> = match pattern.granularity {
                Granularity::Word => pattern.regex().find_iter(text).map(|m| m.as_str()).collect(),
                Granularity::Line => units
                    .iter()
                    .map(|&(start, end)| &text[start..end])
                    .filter(|unit| pattern.regex().is_match(unit))
                    .collect(),
            };
            if matches.is_empty() {
                continue;
            }

            let hits = matches.len().min(MAX_COUNTED_HITS);
            let contribution = pattern.weight * multiplier * (1.0 + 0.5 * (hits - 1) as f64);
            match pattern.category {
                Category::Ai => ai_weight += contribution,
                Category::Human => human_weight += contribution,
            }

            match reason_weights.iter_mut().find(|(code, _)| *code == pattern.reason_code) {
                Some((_, weight)) => *weight += contribution,
                None => reason_weights.push((pattern.reason_code.clone(), contribution)),
            }

            let bucket = match pattern.category {
                Category::Ai => &mut ai_evidence,
                Category::Human => &mut human_evidence,
            };
            for token in matches {
                let Some(item) =
                    EvidenceItem::new(token, pattern.reason.as_str(), pattern.category, pattern.granularity)
                else {
                    continue;
                };
                if !seen.insert((pattern.category, pattern.granularity, item.key())) {
                    continue;
                }
                match pattern.granularity {
                    Granularity::Word => bucket.words.push(item),
                    Granularity::Line => bucket.lines.push(item),
                }
            }
        }

        let score = (BASE_SCORE + POINTS_PER_WEIGHT * (ai_weight - human_weight))
            .round()
            .clamp(0.0, 100.0) as i32;
        let confidence = evidence_confidence(ai_evidence.len(), human_evidence.len());

        // Stable sort keeps first-seen order among equal weights.
        reason_weights.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let reasons = reason_weights.into_iter().map(|(code, _)| code).collect();

        debug!(
            "[HEURISTIC] score={} confidence={} ai_weight={:.2} human_weight={:.2} ai_items={} human_items={}",
            score,
            confidence,
            ai_weight,
            human_weight,
            ai_evidence.len(),
            human_evidence.len()
        );

        HeuristicResult {
            score,
            confidence,
            reasons,
            ai_evidence,
            human_evidence,
        }
    }
}

/// Score with the built-in library at the given sensitivity.
pub fn score_text(text: &str, sensitivity: Sensitivity) -> HeuristicResult {
    HeuristicScorer::default().with_sensitivity(sensitivity).score(text)
}

fn neutral_result() -> HeuristicResult {
    HeuristicResult {
        score: BASE_SCORE as i32,
        confidence: BASE_CONFIDENCE as i32,
        ..HeuristicResult::default()
    }
}

/// Grows with total evidence volume, shrinks as AI and human counts approach parity.
fn evidence_confidence(ai_count: usize, human_count: usize) -> i32 {
    let total = (ai_count + human_count) as f64;
    let volume = 1.0 - (-total / VOLUME_SCALE).exp();
    let parity = match ai_count.max(human_count) {
        0 => 0.0,
        max => ai_count.min(human_count) as f64 / max as f64,
    };
    let confidence = BASE_CONFIDENCE + CONFIDENCE_SPAN * volume * (1.0 - PARITY_PENALTY * parity);
    confidence.round().clamp(0.0, 100.0) as i32
}

/// Byte ranges of sentence-like units: split on newlines and on terminal
/// punctuation followed by whitespace, trimmed, never empty.
fn sentence_units(text: &str) -> Vec<(usize, usize)> {
    let mut units = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if c == '\n' {
            push_trimmed(text, start, i, &mut units);
            start = i + 1;
            continue;
        }
        if matches!(c, '.' | '!' | '?' | '…') {
            let end = i + c.len_utf8();
            let at_boundary = text[end..].chars().next().map_or(true, char::is_whitespace);
            if at_boundary && !is_list_marker(text[start..end].trim()) {
                push_trimmed(text, start, end, &mut units);
                start = end;
            }
        }
    }
    push_trimmed(text, start, text.len(), &mut units);

    units
}

fn push_trimmed(text: &str, start: usize, end: usize, units: &mut Vec<(usize, usize)>) {
    if start >= end {
        return;
    }
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed_end = start + slice.trim_end().len();
    if start + lead < trimmed_end {
        units.push((start + lead, trimmed_end));
    }
}

/// "1." / "12)" at the start of a list line.
fn is_list_marker(s: &str) -> bool {
    let Some(body) = s.strip_suffix(|c: char| c == '.' || c == ')') else {
        return false;
    };
    !body.is_empty() && body.len() <= 2 && body.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::detection::pattern_library::Pattern;

    fn tiny_library() -> PatternLibrary {
        PatternLibrary::new(
            "test",
            vec![
                Pattern::phrase("in conclusion", "cliche_transition", "Cliché transition", 2.0, Category::Ai).unwrap(),
                Pattern::phrase("undeniably", "generic_hedging", "Hedging", 1.5, Category::Ai).unwrap(),
                Pattern::phrase("gonna", "informal_slang", "Slang", 2.0, Category::Human).unwrap(),
                Pattern::line_rule("repeated_punctuation", r"[!?]{2,}", "irregular_punctuation", "Repeated punctuation", 1.5, Category::Human).unwrap(),
            ],
        )
    }

    #[test]
    fn test_blank_text_is_neutral() {
        let lib = tiny_library();
        let result = HeuristicScorer::new(&lib).score("   \n\t ");
        assert_eq!(result.score, 35);
        assert_eq!(result.confidence, 30);
        assert!(result.reasons.is_empty());
        assert!(result.ai_evidence.is_empty());
        assert!(result.human_evidence.is_empty());
    }

    #[test]
    fn test_ai_phrases_raise_score_and_keep_case() {
        let lib = tiny_library();
        let result = HeuristicScorer::new(&lib).score("In conclusion, this is undeniably groundbreaking.");
        assert!(result.score > 35);
        let tokens: Vec<&str> = result.ai_evidence.words.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["In conclusion", "undeniably"]);
        assert!(result.ai_evidence.words.iter().all(|e| e.category == Category::Ai));
        assert_eq!(result.reasons, vec!["cliche_transition", "generic_hedging"]);
    }

    #[test]
    fn test_human_evidence_lowers_score() {
        let lib = tiny_library();
        let scorer = HeuristicScorer::new(&lib);
        let neutral = scorer.score("The weather report came in on time.");
        let human = scorer.score("we're gonna be late again!!");
        assert!(human.score < neutral.score);
        assert_eq!(human.human_evidence.words[0].token, "gonna");
        assert_eq!(human.human_evidence.lines[0].token, "we're gonna be late again!!");
        assert_eq!(human.human_evidence.lines[0].granularity, Granularity::Line);
    }

    #[test]
    fn test_reasons_are_deduplicated_and_weight_ordered() {
        let lib = PatternLibrary::new(
            "test",
            vec![
                Pattern::phrase("arguably", "generic_hedging", "Hedging", 1.0, Category::Ai).unwrap(),
                Pattern::phrase("moreover", "cliche_transition", "Transition", 2.0, Category::Ai).unwrap(),
                Pattern::phrase("to some extent", "generic_hedging", "Hedging", 1.5, Category::Ai).unwrap(),
            ],
        );
        let result = HeuristicScorer::new(&lib).score("Moreover, it is arguably true to some extent.");
        assert_eq!(result.reasons, vec!["generic_hedging", "cliche_transition"]);
    }

    #[test]
    fn test_repeated_hits_are_capped_and_deduplicated() {
        let lib = tiny_library();
        let scorer = HeuristicScorer::new(&lib);
        let three = scorer.score("undeniably undeniably undeniably");
        let six = scorer.score("undeniably undeniably undeniably Undeniably undeniably undeniably");
        assert_eq!(three.score, six.score);
        assert_eq!(six.ai_evidence.words.len(), 1);
    }

    #[test]
    fn test_sensitivity_scales_weights() {
        let lib = tiny_library();
        let text = "In conclusion, it is undeniably so.";
        let low = HeuristicScorer::new(&lib).with_sensitivity(Sensitivity::new(1)).score(text);
        let high = HeuristicScorer::new(&lib).with_sensitivity(Sensitivity::new(10)).score(text);
        assert!(high.score > low.score);
    }

    #[test]
    fn test_confidence_grows_with_volume_and_drops_with_parity() {
        assert_eq!(evidence_confidence(0, 0), 30);
        assert!(evidence_confidence(4, 0) > evidence_confidence(1, 0));
        assert!(evidence_confidence(2, 2) < evidence_confidence(4, 0));
    }

    #[test]
    fn test_sentence_units() {
        let text = "First one. Second?! third...\n1. list item\n\n  tail ";
        let units: Vec<&str> = sentence_units(text).into_iter().map(|(s, e)| &text[s..e]).collect();
        assert_eq!(units, vec!["First one.", "Second?!", "third...", "1. list item", "tail"]);
    }

    #[test]
    fn test_builtin_library_scores_obvious_cases() {
        let ai = score_text(
            "In today's fast-paced world, it's important to note that innovation is undeniably transformative. Moreover, it unlocks a seamless future.",
            Sensitivity::default(),
        );
        let human = score_text("lol my kid just spilled juice everywhere... gonna be a long day!!", Sensitivity::default());
        assert!(ai.score > 70, "ai score {}", ai.score);
        assert!(human.score < 20, "human score {}", human.score);
    }
}
