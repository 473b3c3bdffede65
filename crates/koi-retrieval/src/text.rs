//! Tokenization shared by routing, scoring, and query building.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Function words never used as match terms.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "of", "to", "in", "on", "at", "by", "for", "with",
        "from", "into", "about", "as", "is", "are", "was", "were", "be", "been", "being", "do",
        "does", "did", "has", "have", "had", "what", "which", "who", "whom", "whose", "when",
        "where", "why", "how", "this", "that", "these", "those", "there", "their", "them",
        "they", "it", "its", "can", "could", "should", "would", "will", "may", "might", "must",
        "any", "all", "some", "me", "my", "our", "you", "your", "tell", "show", "list", "give",
        "find", "get", "please", "explain", "describe", "between", "than", "then", "also",
        "not", "no", "yes", "if", "so", "such", "each", "other", "more", "most", "many", "much",
        "very", "just", "only", "over", "under", "via",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Lowercase alphanumeric tokens in order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Tokens longer than two characters that are not stopwords, first
/// occurrence only.
pub fn keyword_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().count() > 2 && !is_stopword(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// `hasField` / `has_field` / `HasField` → `has field`.
pub fn split_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !out.ends_with(' ') {
            out.push(' ');
        }
        out.extend(c.to_lowercase());
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    out.trim_end().to_string()
}

/// Whether `phrase` occurs as a contiguous run of whole tokens.
pub fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let needle = tokenize(phrase);
    if needle.is_empty() || needle.len() > tokens.len() {
        return false;
    }
    tokens.windows(needle.len()).any(|w| w == needle.as_slice())
}
