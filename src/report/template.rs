//! Index template bootstrap
//!
//! Ensures a schema template exists for metric indices so numeric fields
//! get numeric mappings. An operator-managed template under the reserved
//! name is never overwritten, whatever its contents.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::backend::{DocumentStore, IndexTemplate};
use crate::registry::MetricKind;
use crate::utils::StoreError;

/// Reserved template name
pub const TEMPLATE_NAME: &str = "metrics_template";

/// Ensure the metrics template exists for the given base index name
///
/// Checks for an existing template first and treats any hit as
/// confirmation, whether it was installed by this reporter, a concurrent
/// one, or an operator. Only installs the default template when none
/// exists. Safe to call every cycle and under concurrent reporters; a
/// duplicate install race rewrites the identical default template.
pub fn ensure_template(store: &dyn DocumentStore, base_index: &str) -> Result<(), StoreError> {
    if store.template_exists(TEMPLATE_NAME)? {
        debug!(template = TEMPLATE_NAME, "Template already present, skipping install");
        return Ok(());
    }

    let template = default_template(base_index);
    store.put_template(&template)?;
    info!(
        template = TEMPLATE_NAME,
        pattern = %template.pattern,
        "Installed metrics index template"
    );
    Ok(())
}

/// Default template for metric indices
pub fn default_template(base_index: &str) -> IndexTemplate {
    IndexTemplate {
        name: TEMPLATE_NAME.to_string(),
        pattern: format!("{base_index}*"),
        order: 0,
        mappings: default_mappings(),
    }
}

/// Field mappings per metric kind
///
/// Counts map to longs, every statistical/rate/duration field to doubles,
/// so aggregations over stored documents behave numerically.
fn default_mappings() -> Value {
    let mut mappings = serde_json::Map::new();
    for kind in MetricKind::all() {
        mappings.insert(kind.as_str().to_string(), mapping_for(kind));
    }
    Value::Object(mappings)
}

fn mapping_for(kind: MetricKind) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert("name".to_string(), json!({"type": "keyword"}));
    properties.insert("timestamp".to_string(), json!({"type": "date"}));

    let fields: &[(&str, &str)] = match kind {
        MetricKind::Counter => &[("count", "long")],
        // Gauge values pass through as-is; leave `value` dynamically mapped
        MetricKind::Gauge => &[],
        MetricKind::Histogram => &[
            ("count", "long"),
            ("min", "long"),
            ("max", "long"),
            ("mean", "double"),
            ("stddev", "double"),
            ("p50", "long"),
            ("p75", "long"),
            ("p95", "long"),
            ("p98", "long"),
            ("p99", "long"),
            ("p999", "long"),
        ],
        MetricKind::Meter => &[
            ("count", "long"),
            ("mean_rate", "double"),
            ("m1_rate", "double"),
            ("m5_rate", "double"),
            ("m15_rate", "double"),
        ],
        MetricKind::Timer => &[
            ("count", "long"),
            ("min", "double"),
            ("max", "double"),
            ("mean", "double"),
            ("stddev", "double"),
            ("p50", "double"),
            ("p75", "double"),
            ("p95", "double"),
            ("p98", "double"),
            ("p99", "double"),
            ("p999", "double"),
            ("mean_rate", "double"),
            ("m1_rate", "double"),
            ("m5_rate", "double"),
            ("m15_rate", "double"),
        ],
    };
    for (field, field_type) in fields {
        properties.insert(field.to_string(), json!({"type": field_type}));
    }

    json!({"properties": Value::Object(properties)})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;

    #[test]
    fn test_template_installed_once() {
        let store = MemoryStore::new();
        ensure_template(&store, "metrics").unwrap();
        ensure_template(&store, "metrics").unwrap();

        assert_eq!(store.template_count(), 1);
        let template = store.template(TEMPLATE_NAME).unwrap();
        assert_eq!(template.pattern, "metrics*");
        assert_eq!(template.order, 0);
    }

    #[test]
    fn test_operator_template_not_overwritten() {
        let store = MemoryStore::new();
        store
            .put_template(&IndexTemplate {
                name: TEMPLATE_NAME.to_string(),
                pattern: "foo*".to_string(),
                order: 0,
                mappings: json!({}),
            })
            .unwrap();

        ensure_template(&store, "metrics").unwrap();

        let template = store.template(TEMPLATE_NAME).unwrap();
        assert_eq!(template.pattern, "foo*");
    }

    #[test]
    fn test_mappings_cover_every_kind() {
        let template = default_template("metrics");
        for kind in MetricKind::all() {
            assert!(
                template.mappings.get(kind.as_str()).is_some(),
                "missing mapping for {kind}"
            );
        }
        // Duration fields are numeric, not strings
        assert_eq!(
            template.mappings["timer"]["properties"]["mean"]["type"],
            "double"
        );
        assert_eq!(
            template.mappings["counter"]["properties"]["count"]["type"],
            "long"
        );
    }

    #[test]
    fn test_offline_store_propagates_error() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(ensure_template(&store, "metrics").is_err());
    }
}
