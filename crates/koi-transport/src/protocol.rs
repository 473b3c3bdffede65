//! Wire shapes of the backend APIs.
//!
//! The response types are deliberately lenient about envelopes (`{rows}` vs a
//! bare array, `memories` vs `results`) and strict about the payload itself.

use koi_core::errors::BackendError;
use koi_core::models::{GraphRow, ScoredPredicate, VectorMemory};
use serde::{Deserialize, Serialize};

/// Graph endpoint reply.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GraphResponse {
    Rows { rows: Vec<GraphRow> },
    Failed { error: String },
    Bare(Vec<GraphRow>),
}

impl GraphResponse {
    pub fn into_rows(self, dependency: &str) -> Result<Vec<GraphRow>, BackendError> {
        match self {
            Self::Rows { rows } | Self::Bare(rows) => Ok(rows),
            Self::Failed { error } => Err(BackendError::Permanent {
                dependency: dependency.to_string(),
                status: None,
                detail: error,
            }),
        }
    }
}

/// Vector `/query` reply. Servers send `memories`, `results`, or both.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub memories: Option<Vec<WireMemory>>,
    #[serde(default)]
    pub results: Option<Vec<WireMemory>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn into_memories(self, dependency: &str) -> Result<Vec<VectorMemory>, BackendError> {
        if self.success == Some(false) {
            return Err(BackendError::Permanent {
                dependency: dependency.to_string(),
                status: None,
                detail: self
                    .error
                    .unwrap_or_else(|| "search reported failure".to_string()),
            });
        }
        let memories = self.memories.or(self.results).unwrap_or_default();
        Ok(memories.into_iter().map(VectorMemory::from).collect())
    }
}

/// One document as the search API spells it. Older servers send `text`,
/// `score`, and `source`; newer ones send both spellings.
#[derive(Debug, Deserialize)]
pub struct WireMemory {
    pub rid: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub source_sensor: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl From<WireMemory> for VectorMemory {
    fn from(wire: WireMemory) -> Self {
        Self {
            rid: wire.rid,
            content: wire.content.or(wire.text).unwrap_or_default(),
            similarity: wire.similarity.or(wire.score).unwrap_or_default(),
            source_sensor: wire.source_sensor.or(wire.source),
            url: wire.url,
            published_at: wire.published_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarRequest<'a> {
    pub query: &'a str,
    pub top_k: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SimilarResponse {
    Wrapped { predicates: Vec<ScoredPredicate> },
    Bare(Vec<ScoredPredicate>),
}

impl SimilarResponse {
    pub fn into_predicates(self) -> Vec<ScoredPredicate> {
        match self {
            Self::Wrapped { predicates } | Self::Bare(predicates) => predicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn graph_rows_in_either_envelope() {
        let wrapped: GraphResponse = serde_json::from_value(json!({
            "rows": [{"subject": "MsgSend", "predicate": "hasField", "object": "amount"}],
            "count": 1
        }))
        .unwrap();
        let bare: GraphResponse = serde_json::from_value(json!([
            {"subject": "MsgSend", "predicate": "hasField", "object": "amount"}
        ]))
        .unwrap();
        let a = wrapped.into_rows("graph-api").unwrap();
        let b = bare.into_rows("graph-api").unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0]["predicate"], "hasField");
    }

    #[test]
    fn graph_error_body_is_permanent() {
        let failed: GraphResponse =
            serde_json::from_value(json!({"error": "syntax error at MATCH"})).unwrap();
        let err = failed.into_rows("graph-api").unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn search_accepts_both_spellings() {
        let body = json!({
            "success": true,
            "query": "retire credits",
            "memories": [{
                "rid": "orn:notion.page:abc",
                "content": "How to retire credits",
                "text": "How to retire credits",
                "source": "notion",
                "url": "https://example.org/a",
                "score": 0.82,
                "published_at": null
            }],
            "results": [{
                "rid": "orn:notion.page:abc",
                "content": "How to retire credits",
                "text": "How to retire credits",
                "source": "notion",
                "score": 0.82
            }],
            "count": 1
        });
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        let memories = parsed.into_memories("vector-api").unwrap();
        assert_eq!(memories.len(), 1);
        assert_eq!(memories[0].content, "How to retire credits");
        assert_eq!(memories[0].similarity, 0.82);
        assert_eq!(memories[0].source_sensor.as_deref(), Some("notion"));
        assert_eq!(memories[0].published_at, None);
    }

    #[test]
    fn search_results_only_and_empty() {
        let parsed: SearchResponse = serde_json::from_value(json!({
            "results": [{"rid": "r1", "text": "t", "similarity": 0.5, "source_sensor": "github"}]
        }))
        .unwrap();
        let memories = parsed.into_memories("vector-api").unwrap();
        assert_eq!(memories[0].content, "t");
        assert_eq!(memories[0].source_sensor.as_deref(), Some("github"));

        let empty: SearchResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(empty.into_memories("vector-api").unwrap().is_empty());
    }

    #[test]
    fn search_failure_flag_is_an_error() {
        let parsed: SearchResponse =
            serde_json::from_value(json!({"success": false, "error": "index missing"})).unwrap();
        let err = parsed.into_memories("vector-api").unwrap_err();
        assert!(err.to_string().contains("index missing"));
    }

    #[test]
    fn similar_in_either_envelope() {
        let bare: SimilarResponse =
            serde_json::from_value(json!([{"predicate": "hasField", "score": 0.9}])).unwrap();
        let wrapped: SimilarResponse = serde_json::from_value(json!({
            "predicates": [{"predicate": "hasField", "score": 0.9, "count": 1200}]
        }))
        .unwrap();
        assert_eq!(bare.into_predicates()[0].count, 0);
        assert_eq!(wrapped.into_predicates()[0].count, 1200);
    }

    #[test]
    fn similar_request_body() {
        let body = serde_json::to_value(SimilarRequest {
            query: "fields of MsgSend",
            top_k: 20,
        })
        .unwrap();
        assert_eq!(body, json!({"query": "fields of MsgSend", "top_k": 20}));
    }
}
