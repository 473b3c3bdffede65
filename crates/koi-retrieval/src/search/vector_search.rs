//! Post-processing of vector backend results.

use koi_core::models::{VectorMemory, VectorQuery};

/// Keep memories from the requested source sensor, matched on the sensor
/// field or the resource id, and cap at the query limit. Backend order is
/// kept.
pub fn post_filter(memories: Vec<VectorMemory>, query: &VectorQuery) -> Vec<VectorMemory> {
    let sensor = query.source_sensor();
    memories
        .into_iter()
        .filter(|m| match sensor {
            Some(sensor) => m.source_sensor.as_deref() == Some(sensor) || m.rid.contains(sensor),
            None => true,
        })
        .take(query.limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(rid: &str) -> VectorMemory {
        VectorMemory {
            rid: rid.to_string(),
            content: String::new(),
            similarity: 0.5,
            source_sensor: None,
            url: None,
            published_at: None,
        }
    }

    #[test]
    fn without_sensor_only_truncates() {
        let out = post_filter(vec![memory("a"), memory("b"), memory("c")], &VectorQuery::new("q", 2));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].rid, "a");
    }

    #[test]
    fn sensor_matches_rid_or_field() {
        let mut tagged = memory("x");
        tagged.source_sensor = Some("discourse".into());
        let out = post_filter(
            vec![tagged, memory("orn:discourse:7"), memory("orn:web:1")],
            &VectorQuery::new("q", 10).with_source_sensor("discourse"),
        );
        assert_eq!(out.len(), 2);
    }
}
