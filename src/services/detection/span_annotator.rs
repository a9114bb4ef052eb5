// Span Annotator
// Maps merged evidence onto the original text as non-overlapping highlight spans.
//
// Spans are computed against the plain text only; rendering happens once afterwards.

use tracing::debug;

use crate::models::{CategorizedEvidence, Category, EvidenceItem, Granularity, Span};

use super::pattern_library::token_regex;

pub const MAX_WORD_CANDIDATES: usize = 12;
pub const MAX_LINE_CANDIDATES: usize = 6;
const MIN_TOKEN_CHARS: usize = 3;
const MIN_SYMBOLIC_TOKEN_CHARS: usize = 6;
const SHORT_TOKEN_ALLOW_LIST: &[&str] = &["ai", "gpt"];

/// Earlier entries claim text first.
const PRIORITY: [(Category, Granularity); 4] = [
    (Category::Ai, Granularity::Word),
    (Category::Ai, Granularity::Line),
    (Category::Human, Granularity::Word),
    (Category::Human, Granularity::Line),
];

/// Ordered, non-overlapping spans for every evidence occurrence in `text`.
pub fn annotate(text: &str, evidence: &CategorizedEvidence) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    if text.is_empty() {
        return spans;
    }

    for (category, granularity) in PRIORITY {
        let bucket = evidence.get(category).get(granularity);
        for item in select_candidates(bucket, granularity) {
            for (start, end) in find_occurrences(text, &item.token) {
                if spans.iter().any(|s| s.overlaps(start, end)) {
                    continue;
                }
                spans.push(Span {
                    start,
                    end,
                    char_start: 0,
                    char_end: 0,
                    category,
                    granularity,
                    reason: item.reason.clone(),
                });
            }
        }
    }

    spans.sort_by_key(|s| s.start);
    fill_char_offsets(text, &mut spans);
    debug!("[ANNOTATE] {} span(s) over {} bytes", spans.len(), text.len());
    spans
}

/// One forward pass over sorted, non-overlapping spans.
fn fill_char_offsets(text: &str, spans: &mut [Span]) {
    let mut byte_pos = 0;
    let mut char_pos = 0;
    for span in spans.iter_mut() {
        char_pos += text[byte_pos..span.start].chars().count();
        span.char_start = char_pos;
        char_pos += text[span.start..span.end].chars().count();
        span.char_end = char_pos;
        byte_pos = span.end;
    }
}

/// Filters noisy tokens, then keeps the longest ones up to the granularity cap.
fn select_candidates(items: &[EvidenceItem], granularity: Granularity) -> Vec<&EvidenceItem> {
    let cap = match granularity {
        Granularity::Word => MAX_WORD_CANDIDATES,
        Granularity::Line => MAX_LINE_CANDIDATES,
    };

    let mut candidates: Vec<&EvidenceItem> = items.iter().filter(|item| is_annotatable(&item.token)).collect();
    candidates.sort_by_key(|item| std::cmp::Reverse(token_len(&item.token)));
    candidates.truncate(cap);
    candidates
}

fn is_annotatable(token: &str) -> bool {
    let trimmed = token.trim();
    let len = token_len(trimmed);
    if len < MIN_TOKEN_CHARS && !SHORT_TOKEN_ALLOW_LIST.contains(&trimmed.to_lowercase().as_str()) {
        return false;
    }
    if !trimmed.chars().any(char::is_alphabetic) && len < MIN_SYMBOLIC_TOKEN_CHARS {
        return false;
    }
    true
}

fn token_len(token: &str) -> usize {
    token.trim().chars().count()
}

/// Exact matches first; the whitespace-tolerant form only when there are none.
fn find_occurrences(text: &str, token: &str) -> Vec<(usize, usize)> {
    for flexible in [false, true] {
        let re = match token_regex(token, flexible) {
            Ok(re) => re,
            Err(e) => {
                debug!("[ANNOTATE] skipping token {:?}: {}", token, e);
                return Vec::new();
            }
        };
        let found: Vec<(usize, usize)> = re
            .find_iter(text)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| (m.start(), m.end()))
            .collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvidenceBuckets;
    use crate::services::detection::heuristic::HeuristicScorer;
    use crate::services::detection::pattern_library::{Pattern, PatternLibrary};
    use proptest::prelude::*;

    fn item(token: &str, category: Category, granularity: Granularity) -> EvidenceItem {
        EvidenceItem::new(token, format!("{} reason", token), category, granularity).unwrap()
    }

    fn evidence(ai_words: &[&str], ai_lines: &[&str], human_words: &[&str], human_lines: &[&str]) -> CategorizedEvidence {
        let bucket = |tokens: &[&str], category, granularity| -> Vec<EvidenceItem> {
            tokens.iter().map(|t| item(t, category, granularity)).collect()
        };
        CategorizedEvidence {
            ai: EvidenceBuckets {
                words: bucket(ai_words, Category::Ai, Granularity::Word),
                lines: bucket(ai_lines, Category::Ai, Granularity::Line),
            },
            human: EvidenceBuckets {
                words: bucket(human_words, Category::Human, Granularity::Word),
                lines: bucket(human_lines, Category::Human, Granularity::Line),
            },
        }
    }

    #[test]
    fn test_two_phrase_library_annotates_exact_substrings() {
        let lib = PatternLibrary::new(
            "test",
            vec![
                Pattern::phrase("in conclusion", "cliche_transition", "Cliché transition", 2.0, Category::Ai).unwrap(),
                Pattern::phrase("undeniably", "generic_hedging", "Generic hedging", 1.5, Category::Ai).unwrap(),
            ],
        );
        let text = "In conclusion, this is undeniably groundbreaking.";
        let heur = HeuristicScorer::new(&lib).score(text);
        let merged = CategorizedEvidence {
            ai: heur.ai_evidence.clone(),
            human: heur.human_evidence.clone(),
        };

        let spans = annotate(text, &merged);
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.category == Category::Ai));
        assert_eq!(&text[spans[0].start..spans[0].end], "In conclusion");
        assert_eq!(&text[spans[1].start..spans[1].end], "undeniably");
    }

    #[test]
    fn test_every_occurrence_is_annotated() {
        let spans = annotate("delve here, Delve there", &evidence(&["delve"], &[], &[], &[]));
        assert_eq!(spans.iter().map(|s| (s.start, s.end)).collect::<Vec<_>>(), vec![(0, 5), (12, 17)]);
    }

    #[test]
    fn test_ai_claims_before_human() {
        let text = "honestly this is robust work";
        let spans = annotate(text, &evidence(&["robust"], &[], &["is robust"], &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, Category::Ai);
    }

    #[test]
    fn test_longer_tokens_win_within_bucket() {
        let text = "It is worth noting the landscape.";
        let spans = annotate(text, &evidence(&["worth", "it is worth noting"], &[], &[], &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].start..spans[0].end], "It is worth noting");
    }

    #[test]
    fn test_whitespace_tolerant_fallback() {
        let text = "It is worth\n   noting that";
        let spans = annotate(text, &evidence(&[], &["it is worth noting"], &[], &[]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].granularity, Granularity::Line);
        assert_eq!(&text[spans[0].start..spans[0].end], "It is worth\n   noting");
    }

    #[test]
    fn test_noisy_tokens_are_dropped() {
        let text = "so AI is ok -- 12345 and 2024-01-01";
        let spans = annotate(text, &evidence(&["ok", "ai", "--", "12345", "2024-01-01"], &[], &[], &[]));
        let covered: Vec<&str> = spans.iter().map(|s| &text[s.start..s.end]).collect();
        assert_eq!(covered, vec!["AI", "2024-01-01"]);
    }

    #[test]
    fn test_word_candidates_are_capped() {
        let tokens: Vec<String> = (0..15).map(|i| format!("word{:02}", i)).collect();
        let text = tokens.join(" ");
        let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let spans = annotate(&text, &evidence(&refs, &[], &[], &[]));
        assert_eq!(spans.len(), MAX_WORD_CANDIDATES);
    }

    #[test]
    fn test_offsets_on_multibyte_text() {
        let text = "Café owners — delve deeper";
        let spans = annotate(text, &evidence(&["delve"], &[], &[], &[]));
        assert_eq!(&text[spans[0].start..spans[0].end], "delve");
        assert_eq!((spans[0].char_start, spans[0].char_end), (14, 19));
    }

    #[test]
    fn test_char_offsets_serialize_for_display() {
        let text = "Ünïcödé tapestry, then robust";
        let spans = annotate(text, &evidence(&["tapestry", "robust"], &[], &[], &[]));
        let chars: Vec<char> = text.chars().collect();
        for s in &spans {
            let by_char: String = chars[s.char_start..s.char_end].iter().collect();
            assert_eq!(by_char, &text[s.start..s.end]);
        }
        assert_eq!((spans[0].char_start, spans[0].char_end), (8, 16));
        let json = serde_json::to_value(&spans[0]).unwrap();
        assert_eq!(json["charStart"], 8);
        assert_eq!(json["charEnd"], 16);
        assert_eq!(json["start"], 12);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(annotate("", &evidence(&["delve"], &[], &[], &[])).is_empty());
        assert!(annotate("some text", &CategorizedEvidence::default()).is_empty());
    }

    const VOCAB: &[&str] = &["alpha", "beta", "gamma", "delta", "alpha beta", "beta gamma", "gamma delta alpha"];

    proptest! {
        #[test]
        fn prop_spans_never_overlap(
            words in prop::collection::vec(0usize..4, 0..30),
            picks in prop::collection::vec((0usize..VOCAB.len(), 0usize..4), 0..12),
        ) {
            let text = words.iter().map(|&i| VOCAB[i]).collect::<Vec<_>>().join(" ");
            let mut ev = CategorizedEvidence::default();
            for (v, bucket) in picks {
                let token = VOCAB[v];
                let (category, granularity) = PRIORITY[bucket];
                let target = match category {
                    Category::Ai => &mut ev.ai,
                    Category::Human => &mut ev.human,
                };
                let list = match granularity {
                    Granularity::Word => &mut target.words,
                    Granularity::Line => &mut target.lines,
                };
                list.push(item(token, category, granularity));
            }

            let spans = annotate(&text, &ev);
            for pair in spans.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start);
            }
            for s in &spans {
                prop_assert!(s.start < s.end && s.end <= text.len());
                prop_assert_eq!(s.char_start, text[..s.start].chars().count());
                prop_assert_eq!(s.char_end - s.char_start, text[s.start..s.end].chars().count());
                prop_assert!(text.is_char_boundary(s.start) && text.is_char_boundary(s.end));
            }
        }
    }
}
