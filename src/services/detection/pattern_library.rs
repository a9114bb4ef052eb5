// Pattern Library
// Static, versioned lists of AI-leaning and human-leaning phrases and line rules.
//
// Phrases are matched at word granularity, rules at line granularity.
// The built-in library is compiled once on first use and is read-only afterwards.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Category, Granularity};

pub const PATTERN_LIBRARY_VERSION: &str = "patterns-v1.3";

struct PhraseGroup {
    reason_code: &'static str,
    reason: &'static str,
    weight: f64,
    category: Category,
    phrases: &'static [&'static str],
}

struct LineRule {
    id: &'static str,
    pattern: &'static str,
    reason_code: &'static str,
    reason: &'static str,
    weight: f64,
    category: Category,
}

const PHRASE_GROUPS: &[PhraseGroup] = &[
    PhraseGroup {
        reason_code: "cliche_transition",
        reason: "Cliché transition phrase",
        weight: 2.0,
        category: Category::Ai,
        phrases: &[
            "in conclusion",
            "in summary",
            "furthermore",
            "moreover",
            "additionally",
            "ultimately",
            "that being said",
            "on the other hand",
            "it's worth noting",
            "it is worth noting",
            "it's important to note",
            "it is important to note",
            "at the end of the day",
            "in today's fast-paced world",
            "in today's digital age",
            "let's dive in",
            "without further ado",
        ],
    },
    PhraseGroup {
        reason_code: "generic_hedging",
        reason: "Generic hedging",
        weight: 1.5,
        category: Category::Ai,
        phrases: &[
            "undeniably",
            "arguably",
            "it could be argued",
            "generally speaking",
            "to some extent",
            "in many ways",
            "it goes without saying",
            "plays a crucial role",
            "a testament to",
        ],
    },
    PhraseGroup {
        reason_code: "buzzword",
        reason: "Inflated buzzword",
        weight: 1.5,
        category: Category::Ai,
        phrases: &[
            "groundbreaking",
            "game-changer",
            "game-changing",
            "cutting-edge",
            "ever-evolving",
            "transformative",
            "revolutionize",
            "delve",
            "delves",
            "tapestry",
            "leverage",
            "seamless",
            "seamlessly",
            "elevate",
            "unlock",
            "empower",
            "landscape",
            "paradigm",
            "synergy",
            "holistic",
            "robust",
            "navigate the complexities",
        ],
    },
    PhraseGroup {
        reason_code: "informal_slang",
        reason: "Informal contraction or slang",
        weight: 2.0,
        category: Category::Human,
        phrases: &[
            "gonna", "wanna", "gotta", "kinda", "sorta", "dunno", "y'all", "ain't", "lol", "lmao",
            "tbh", "idk", "imo", "ngl", "omg", "nah", "yeah",
        ],
    },
    PhraseGroup {
        reason_code: "first_person_anecdote",
        reason: "First-person anecdote",
        weight: 2.0,
        category: Category::Human,
        phrases: &[
            "my wife",
            "my husband",
            "my kid",
            "my kids",
            "my mom",
            "my dad",
            "my buddy",
            "i remember",
            "i swear",
            "yesterday i",
            "last night",
            "last week i",
            "true story",
        ],
    },
];

const LINE_RULES: &[LineRule] = &[
    LineRule {
        id: "list_marker",
        pattern: r"^\s*(?:\d{1,2}[.)]|[-*•])\s+\S",
        reason_code: "structural_marker",
        reason: "Templated list structure",
        weight: 1.0,
        category: Category::Ai,
    },
    LineRule {
        id: "contrast_construction",
        pattern: r"(?i)\bnot\s+(?:just|only|merely)\b.{1,60}\bbut\b",
        reason_code: "structural_marker",
        reason: "\"Not just X, but Y\" construction",
        weight: 1.5,
        category: Category::Ai,
    },
    LineRule {
        id: "hook_opener",
        pattern: r"(?i)^\s*(?:here['’]s\s+(?:why|how|the\s+thing)|here\s+are\s+\d+|let\s+me\s+explain|ever\s+wondered|imagine\s+a\s+world)\b",
        reason_code: "hook_opener",
        reason: "Engagement-bait opener",
        weight: 1.5,
        category: Category::Ai,
    },
    LineRule {
        id: "triadic_list",
        pattern: r"(?i)\b\w{3,},\s+\w{3,},?\s+and\s+\w{3,}\b",
        reason_code: "structural_marker",
        reason: "Rule-of-three listing",
        weight: 0.75,
        category: Category::Ai,
    },
    LineRule {
        id: "repeated_punctuation",
        pattern: r"[!?]{2,}",
        reason_code: "irregular_punctuation",
        reason: "Repeated punctuation",
        weight: 1.5,
        category: Category::Human,
    },
    LineRule {
        id: "trailing_ellipsis",
        pattern: r"\.{3,}|…",
        reason_code: "irregular_punctuation",
        reason: "Trailing ellipsis",
        weight: 1.0,
        category: Category::Human,
    },
    LineRule {
        id: "lowercase_start",
        pattern: r"^\s*[a-z]",
        reason_code: "irregular_punctuation",
        reason: "Sentence starts lowercase",
        weight: 0.75,
        category: Category::Human,
    },
    LineRule {
        id: "all_caps_run",
        pattern: r"\b[A-Z]{3,}(?:\s+[A-Z]{3,})+\b",
        reason_code: "irregular_punctuation",
        reason: "All-caps emphasis",
        weight: 1.0,
        category: Category::Human,
    },
];

/// One compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Phrase text for word patterns, rule id for line patterns.
    pub id: String,
    pub reason_code: String,
    pub reason: String,
    pub weight: f64,
    pub category: Category,
    pub granularity: Granularity,
    regex: Regex,
}

impl Pattern {
    /// Word-granularity phrase, matched case-insensitively on token boundaries
    /// with any run of whitespace between its words.
    pub fn phrase(
        phrase: &str,
        reason_code: &str,
        reason: &str,
        weight: f64,
        category: Category,
    ) -> Result<Self, regex::Error> {
        let regex = token_regex(phrase, true)?;
        Ok(Self {
            id: phrase.trim().to_string(),
            reason_code: reason_code.to_string(),
            reason: reason.to_string(),
            weight,
            category,
            granularity: Granularity::Word,
            regex,
        })
    }

    /// Line-granularity rule, tested against each sentence of the text.
    pub fn line_rule(
        id: &str,
        pattern: &str,
        reason_code: &str,
        reason: &str,
        weight: f64,
        category: Category,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            id: id.to_string(),
            reason_code: reason_code.to_string(),
            reason: reason.to_string(),
            weight,
            category,
            granularity: Granularity::Line,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

#[derive(Debug, Clone)]
pub struct PatternLibrary {
    version: String,
    patterns: Vec<Pattern>,
}

impl PatternLibrary {
    pub fn new(version: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Self {
            version: version.into(),
            patterns,
        }
    }

    /// The shipped library, compiled on first use.
    pub fn builtin() -> &'static PatternLibrary {
        static LIBRARY: OnceLock<PatternLibrary> = OnceLock::new();
        LIBRARY.get_or_init(|| {
            let mut patterns = Vec::new();
            for group in PHRASE_GROUPS {
                for phrase in group.phrases {
                    patterns.push(
                        Pattern::phrase(phrase, group.reason_code, group.reason, group.weight, group.category)
                            .expect("builtin phrase pattern"),
                    );
                }
            }
            for rule in LINE_RULES {
                patterns.push(
                    Pattern::line_rule(rule.id, rule.pattern, rule.reason_code, rule.reason, rule.weight, rule.category)
                        .expect("builtin line rule"),
                );
            }
            PatternLibrary::new(PATTERN_LIBRARY_VERSION, patterns)
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Case-insensitive regex for a literal token.
///
/// Word boundaries are added only on ends that start/finish with a word character,
/// and straight and curly apostrophes match each other. With `flexible_whitespace`,
/// each internal run of whitespace matches any run of whitespace in the text.
pub(crate) fn token_regex(token: &str, flexible_whitespace: bool) -> Result<Regex, regex::Error> {
    let trimmed = token.trim();
    let body = if flexible_whitespace {
        trimmed
            .split_whitespace()
            .map(escape_literal)
            .collect::<Vec<_>>()
            .join(r"\s+")
    } else {
        escape_literal(trimmed)
    };

    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if trimmed.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let tail = if trimmed.chars().last().is_some_and(is_word) { r"\b" } else { "" };

    Regex::new(&format!("(?i){}{}{}", lead, body, tail))
}

fn escape_literal(s: &str) -> String {
    regex::escape(s).replace(|c: char| c == '\'' || c == '’', "['’]")
}
