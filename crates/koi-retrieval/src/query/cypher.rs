//! Cypher text for a [`GraphQuery`].

use koi_core::models::Branch;

use super::GraphQuery;

const MATCH_CLAUSE: &str = "MATCH (s)-[r]->(o)";
const RETURN_CLAUSE: &str = "RETURN s.name AS subject, type(r) AS predicate, o.name AS object";

/// Escape text for a single-quoted Cypher string literal.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

pub fn quote(text: &str) -> String {
    format!("'{}'", escape_literal(text))
}

/// Case-insensitive "contains" regex with metacharacters escaped.
pub fn contains_regex(term: &str) -> String {
    quote(&format!("(?i).*{}.*", regex::escape(term)))
}

fn list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.into_iter().map(quote).collect();
    format!("[{}]", quoted.join(", "))
}

impl GraphQuery {
    /// Serialize to a single Cypher statement. Always ends with `LIMIT`.
    pub fn to_cypher(&self) -> String {
        let mut conditions: Vec<String> = Vec::new();

        if self.branch == Branch::Focused && !self.predicates.is_empty() {
            conditions.push(format!(
                "type(r) IN {}",
                list(self.predicates.iter().map(String::as_str))
            ));
        }

        let matches = self.match_conditions();
        if !matches.is_empty() {
            conditions.push(format!("({})", matches.join(" OR ")));
        }

        if !self.categories.is_empty() {
            conditions.push(format!(
                "r.canonical_category IN {}",
                list(self.categories.iter().map(|c| c.as_str()))
            ));
        }

        if !self.negative_terms.is_empty() {
            let noise: Vec<String> = self
                .negative_terms
                .iter()
                .flat_map(|t| {
                    let t = quote(t);
                    [
                        format!("toLower(s.name) CONTAINS {t}"),
                        format!("toLower(o.name) CONTAINS {t}"),
                    ]
                })
                .collect();
            conditions.push(format!("NOT ({})", noise.join(" OR ")));
        }

        let mut text = String::from(MATCH_CLAUSE);
        if !conditions.is_empty() {
            text.push_str("\nWHERE ");
            text.push_str(&conditions.join("\n  AND "));
        }
        text.push('\n');
        text.push_str(RETURN_CLAUSE);
        text.push_str(&format!("\nLIMIT {}", self.limit));
        text
    }

    /// Alias of [`GraphQuery::to_cypher`].
    pub fn query_text(&self) -> String {
        self.to_cypher()
    }

    /// Entity regexes first, then keyword containment.
    fn match_conditions(&self) -> Vec<String> {
        let mut out = Vec::new();
        for term in &self.entity_terms {
            let pattern = contains_regex(term);
            out.push(format!("s.name =~ {pattern}"));
            out.push(format!("o.name =~ {pattern}"));
        }
        for term in &self.keyword_terms {
            let kw = quote(&term.to_lowercase());
            out.push(format!("toLower(s.name) CONTAINS {kw}"));
            out.push(format!("toLower(o.name) CONTAINS {kw}"));
            if self.match_predicate_text {
                out.push(format!("toLower(type(r)) CONTAINS {kw}"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_escaped() {
        assert_eq!(escape_literal("O'Brien"), "O\\'Brien");
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_literal("line\nbreak"), "line break");
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        assert_eq!(contains_regex("a.b"), "'(?i).*a\\\\.b.*'");
        assert_eq!(contains_regex("x'y"), "'(?i).*x\\'y.*'");
    }
}
