//! Entity detection: lexicon lookup first, then identifier and proper-noun
//! heuristics over the spans the lexicon left uncovered.

use std::ops::Range;
use std::sync::LazyLock;

use koi_core::models::DetectedEntity;
use regex::Regex;

use crate::tables::{EntityLexicon, PatternKind};

pub const EXACT_CONFIDENCE: f64 = 1.0;
pub const CASE_INSENSITIVE_CONFIDENCE: f64 = 0.9;
pub const ALIAS_CONFIDENCE: f64 = 0.8;
pub const IDENTIFIER_CONFIDENCE: f64 = 0.8;
pub const PROPER_NOUN_CONFIDENCE: f64 = 0.6;

pub const TYPE_IDENTIFIER: &str = "identifier";
pub const TYPE_PROPER_NOUN: &str = "proper_noun";

/// CamelCase identifiers, `Msg*` messages, `*Keeper` types.
pub static RE_IDENTIFIER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:[A-Z][a-z0-9]+){2,}\w*\b|\bMsg[A-Z]\w*\b|\b\w+Keeper\b").ok()
});

/// Runs of two or more capitalized words.
pub static RE_CAPITALIZED_SPAN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][\w-]*(?:\s+[A-Z][\w-]*)+\b").ok()
});

/// Sentence-initial words that are capitalized but not part of a name.
const LEADING_FILLERS: &[&str] = &[
    "What", "Who", "Which", "Where", "When", "Why", "How", "Show", "List", "Tell", "Find",
    "Give", "Does", "Do", "Is", "Are", "Can", "The", "A", "An", "All", "Explain", "Describe",
];

/// An entity mention with its byte span in the query.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMatch {
    pub entity: DetectedEntity,
    pub span: Range<usize>,
}

/// Detect entities in `query`, lexicon matches first.
pub fn detect(query: &str, lexicon: &EntityLexicon) -> Vec<EntityMatch> {
    let mut found = lexicon_matches(query, lexicon);
    let covered: Vec<Range<usize>> = found.iter().map(|m| m.span.clone()).collect();

    let mut heuristic = Vec::new();
    if let Some(re) = RE_IDENTIFIER.as_ref() {
        for m in re.find_iter(query) {
            if !overlaps_any(&m.range(), &covered) {
                heuristic.push(EntityMatch {
                    entity: DetectedEntity {
                        name: m.as_str().to_string(),
                        entity_type: TYPE_IDENTIFIER.to_string(),
                        confidence: IDENTIFIER_CONFIDENCE,
                    },
                    span: m.range(),
                });
            }
        }
    }
    if let Some(re) = RE_CAPITALIZED_SPAN.as_ref() {
        for m in re.find_iter(query) {
            let Some((text, span)) = trim_leading_fillers(m.as_str(), m.start()) else {
                continue;
            };
            let taken: Vec<Range<usize>> = covered
                .iter()
                .cloned()
                .chain(heuristic.iter().map(|h: &EntityMatch| h.span.clone()))
                .collect();
            if overlaps_any(&span, &taken) {
                continue;
            }
            heuristic.push(EntityMatch {
                entity: DetectedEntity {
                    name: text.to_string(),
                    entity_type: TYPE_PROPER_NOUN.to_string(),
                    confidence: PROPER_NOUN_CONFIDENCE,
                },
                span,
            });
        }
    }

    found.extend(heuristic);
    found
}

fn lexicon_matches(query: &str, lexicon: &EntityLexicon) -> Vec<EntityMatch> {
    let mut candidates: Vec<EntityMatch> = Vec::new();
    for pattern in lexicon.candidates(query) {
        let Some(record) = lexicon.record(pattern.record) else {
            continue;
        };
        for m in pattern.regex.find_iter(query) {
            let confidence = match pattern.kind {
                PatternKind::Name if m.as_str() == record.name => EXACT_CONFIDENCE,
                PatternKind::Name => CASE_INSENSITIVE_CONFIDENCE,
                PatternKind::Alias => ALIAS_CONFIDENCE,
            };
            candidates.push(lexicon_match(&record.name, &record.entity_type, confidence, m.range()));
        }
    }

    // Highest confidence first, then earliest, then longest.
    candidates.sort_by(|a, b| {
        b.entity
            .confidence
            .total_cmp(&a.entity.confidence)
            .then_with(|| a.span.start.cmp(&b.span.start))
            .then_with(|| b.span.len().cmp(&a.span.len()))
    });
    let mut kept: Vec<EntityMatch> = Vec::new();
    for candidate in candidates {
        let spans: Vec<Range<usize>> = kept.iter().map(|k| k.span.clone()).collect();
        if !overlaps_any(&candidate.span, &spans) {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|k| k.span.start);
    kept
}

fn lexicon_match(name: &str, entity_type: &str, confidence: f64, span: Range<usize>) -> EntityMatch {
    EntityMatch {
        entity: DetectedEntity {
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            confidence,
        },
        span,
    }
}

fn trim_leading_fillers(span: &str, start: usize) -> Option<(&str, Range<usize>)> {
    let mut offset = 0;
    let mut rest = span;
    loop {
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..word_end];
        if !LEADING_FILLERS.contains(&word) {
            break;
        }
        let after = rest[word_end..].trim_start();
        offset += rest.len() - after.len();
        rest = after;
    }
    // Still a multi-word span after trimming.
    if !rest.contains(char::is_whitespace) {
        return None;
    }
    Some((rest, start + offset..start + span.len()))
}

fn overlaps_any(span: &Range<usize>, others: &[Range<usize>]) -> bool {
    others
        .iter()
        .any(|o| span.start < o.end && o.start < span.end)
}
