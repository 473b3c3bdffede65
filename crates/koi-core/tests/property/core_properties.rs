use koi_core::errors::{is_retriable_status, BackendError};
use koi_core::models::{GraphRow, Triple};
use koi_core::KoiConfig;
use proptest::prelude::*;
use serde_json::{json, Value};

fn row(subject: &str, predicate: &str, object: &str) -> GraphRow {
    match json!({"subject": subject, "predicate": predicate, "object": object}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

proptest! {
    #[test]
    fn status_variant_matches_retriable_table(status in 100u16..600) {
        let err = BackendError::from_status("graph-api", status, "detail");
        prop_assert_eq!(err.is_transient(), is_retriable_status(status));
    }

    #[test]
    fn quoted_and_plain_rows_share_a_key(
        subject in "[A-Za-z][A-Za-z0-9 ]{0,16}",
        predicate in "[a-z][A-Za-z]{0,12}",
        object in "[A-Za-z0-9 ]{1,16}",
    ) {
        let plain = Triple::from_row(&row(&subject, &predicate, &object)).unwrap();
        let quoted = Triple::from_row(&row(
            &format!("\"{subject}\""),
            &format!("\"{predicate}\""),
            &format!("\"{object}\""),
        ))
        .unwrap();
        prop_assert_eq!(plain.key(), quoted.key());
        prop_assert_eq!(plain.key(), (subject, predicate, object));
    }

    #[test]
    fn coverage_target_bounds(target in -2.0f64..3.0) {
        let mut config = KoiConfig::default();
        config.retrieval.coverage_target = target;
        prop_assert_eq!(config.validate().is_ok(), (0.0..=1.0).contains(&target));
    }

    #[test]
    fn base_k_never_exceeds_max_k(base_k in 1usize..300, max_k in 1usize..300) {
        let mut config = KoiConfig::default();
        config.retrieval.base_k = base_k;
        config.retrieval.max_k = max_k;
        prop_assert_eq!(config.validate().is_ok(), base_k <= max_k);
    }
}
