//! In-process document store
//!
//! Reference `DocumentStore` implementation holding everything in memory.
//! Used by the test suite and as a template for real backend clients.
//! Supports fault injection so callers can exercise connectivity and
//! partial-write handling.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::{BulkAction, BulkItemFailure, BulkResponse, DocumentStore, IndexTemplate};
use crate::utils::StoreError;

/// A stored document with its type
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub doc_type: String,
    pub source: Value,
}

/// One condition of a standing query; all conditions must hold
#[derive(Debug, Clone)]
pub enum Condition {
    /// Exact string match on a field
    Term { field: String, value: String },
    /// Numeric field >= value
    RangeGte { field: String, value: f64 },
    /// Numeric field <= value
    RangeLte { field: String, value: f64 },
}

impl Condition {
    fn matches(&self, document: &Value) -> bool {
        match self {
            Condition::Term { field, value } => match document.get(field) {
                Some(Value::String(s)) => s == value,
                Some(other) => other.to_string() == *value,
                None => false,
            },
            Condition::RangeGte { field, value } => {
                field_as_f64(document, field).is_some_and(|v| v >= *value)
            }
            Condition::RangeLte { field, value } => {
                field_as_f64(document, field).is_some_and(|v| v <= *value)
            }
        }
    }
}

fn field_as_f64(document: &Value, field: &str) -> Option<f64> {
    match document.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// Standing query evaluated against newly written documents
///
/// Deliberately minimal: an AND-list of term and range conditions, which
/// is all the alerting convention needs.
#[derive(Debug, Clone, Default)]
pub struct StandingQuery {
    conditions: Vec<Condition>,
}

impl StandingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an exact string match on a field
    pub fn term(mut self, field: &str, value: &str) -> Self {
        self.conditions.push(Condition::Term {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Require a numeric field >= value
    pub fn gte(mut self, field: &str, value: f64) -> Self {
        self.conditions.push(Condition::RangeGte {
            field: field.to_string(),
            value,
        });
        self
    }

    /// Require a numeric field <= value
    pub fn lte(mut self, field: &str, value: f64) -> Self {
        self.conditions.push(Condition::RangeLte {
            field: field.to_string(),
            value,
        });
        self
    }

    /// Evaluate against a document
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }
}

#[derive(Default)]
struct FaultInjection {
    offline: bool,
    reject_names: Vec<String>,
}

#[derive(Default)]
struct StoreState {
    indices: HashMap<String, Vec<StoredDocument>>,
    templates: HashMap<String, IndexTemplate>,
    /// index name -> query id -> query
    queries: HashMap<String, HashMap<String, StandingQuery>>,
}

/// In-memory `DocumentStore`
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    faults: Mutex<FaultInjection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend being unreachable
    pub fn set_offline(&self, offline: bool) {
        self.faults.lock().offline = offline;
    }

    /// Reject any bulk document whose `name` field equals the given name
    pub fn reject_documents_named(&self, name: &str) {
        self.faults.lock().reject_names.push(name.to_string());
    }

    /// Register a standing query for an index
    pub fn register_query(&self, index: &str, id: &str, query: StandingQuery) {
        self.state
            .write()
            .queries
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), query);
    }

    /// Documents of one type in an index
    pub fn search(&self, index: &str, doc_type: &str) -> Vec<Value> {
        let state = self.state.read();
        state
            .indices
            .get(index)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.doc_type == doc_type)
                    .map(|d| d.source.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of documents of one type in an index
    pub fn document_count(&self, index: &str, doc_type: &str) -> usize {
        self.search(index, doc_type).len()
    }

    /// All index names with at least one document
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().indices.keys().cloned().collect();
        names.sort();
        names
    }

    /// Installed template by name
    pub fn template(&self, name: &str) -> Option<IndexTemplate> {
        self.state.read().templates.get(name).cloned()
    }

    /// Number of installed templates
    pub fn template_count(&self) -> usize {
        self.state.read().templates.len()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.faults.lock().offline {
            Err(StoreError::Offline("memory store set offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn template_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self.state.read().templates.contains_key(name))
    }

    fn put_template(&self, template: &IndexTemplate) -> Result<(), StoreError> {
        self.check_online()?;
        self.state
            .write()
            .templates
            .insert(template.name.clone(), template.clone());
        Ok(())
    }

    fn bulk_index(&self, actions: &[BulkAction]) -> Result<BulkResponse, StoreError> {
        self.check_online()?;
        let reject_names = self.faults.lock().reject_names.clone();

        let mut state = self.state.write();
        let mut response = BulkResponse::default();
        for (position, action) in actions.iter().enumerate() {
            let name = action
                .document
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if reject_names.iter().any(|r| r == name) {
                response.failures.push(BulkItemFailure {
                    position,
                    reason: format!("document {name:?} rejected"),
                });
                continue;
            }
            state
                .indices
                .entry(action.index.clone())
                .or_default()
                .push(StoredDocument {
                    doc_type: action.doc_type.clone(),
                    source: action.document.clone(),
                });
            response.accepted += 1;
        }
        Ok(response)
    }

    fn percolate(
        &self,
        index: &str,
        _doc_type: &str,
        document: &Value,
    ) -> Result<Vec<String>, StoreError> {
        self.check_online()?;
        let state = self.state.read();
        let mut matches: Vec<String> = state
            .queries
            .get(index)
            .map(|queries| {
                queries
                    .iter()
                    .filter(|(_, q)| q.matches(document))
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default();
        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(index: &str, doc_type: &str, document: Value) -> BulkAction {
        BulkAction {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            document,
        }
    }

    #[test]
    fn test_bulk_index_and_search() {
        let store = MemoryStore::new();
        let response = store
            .bulk_index(&[
                action("metrics", "counter", json!({"name": "a", "count": 1})),
                action("metrics", "gauge", json!({"name": "b", "value": 2})),
            ])
            .unwrap();

        assert_eq!(response.accepted, 2);
        assert!(response.failures.is_empty());
        assert_eq!(store.document_count("metrics", "counter"), 1);
        assert_eq!(store.document_count("metrics", "gauge"), 1);
        assert_eq!(store.document_count("metrics", "timer"), 0);
    }

    #[test]
    fn test_offline_store_errors() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(store.bulk_index(&[]).is_err());
        assert!(store.template_exists("metrics_template").is_err());

        store.set_offline(false);
        assert!(store.bulk_index(&[]).is_ok());
    }

    #[test]
    fn test_rejected_documents_are_reported_not_stored() {
        let store = MemoryStore::new();
        store.reject_documents_named("bad");

        let response = store
            .bulk_index(&[
                action("metrics", "counter", json!({"name": "good", "count": 1})),
                action("metrics", "counter", json!({"name": "bad", "count": 2})),
                action("metrics", "counter", json!({"name": "also-good", "count": 3})),
            ])
            .unwrap();

        assert_eq!(response.accepted, 2);
        assert_eq!(response.failures.len(), 1);
        assert_eq!(response.failures[0].position, 1);
        assert_eq!(store.document_count("metrics", "counter"), 2);
    }

    #[test]
    fn test_template_round_trip() {
        let store = MemoryStore::new();
        assert!(!store.template_exists("metrics_template").unwrap());

        store
            .put_template(&IndexTemplate {
                name: "metrics_template".to_string(),
                pattern: "metrics*".to_string(),
                order: 0,
                mappings: json!({}),
            })
            .unwrap();

        assert!(store.template_exists("metrics_template").unwrap());
        assert_eq!(
            store.template("metrics_template").unwrap().pattern,
            "metrics*"
        );
    }

    #[test]
    fn test_standing_query_matching() {
        let query = StandingQuery::new().term("name", "app.foo").gte("count", 20.0);

        assert!(query.matches(&json!({"name": "app.foo", "count": 25})));
        assert!(query.matches(&json!({"name": "app.foo", "count": 20})));
        assert!(!query.matches(&json!({"name": "app.foo", "count": 19})));
        assert!(!query.matches(&json!({"name": "app.bar", "count": 25})));
        assert!(!query.matches(&json!({"count": 25})));
    }

    #[test]
    fn test_percolate_returns_matching_query_ids() {
        let store = MemoryStore::new();
        store.register_query(
            "metrics",
            "high-count",
            StandingQuery::new().gte("count", 20.0),
        );
        store.register_query(
            "metrics",
            "named-foo",
            StandingQuery::new().term("name", "foo"),
        );

        let matches = store
            .percolate("metrics", "counter", &json!({"name": "foo", "count": 50}))
            .unwrap();
        assert_eq!(matches, vec!["high-count", "named-foo"]);

        let matches = store
            .percolate("metrics", "counter", &json!({"name": "bar", "count": 5}))
            .unwrap();
        assert!(matches.is_empty());

        // Queries are per index
        let matches = store
            .percolate("other", "counter", &json!({"name": "foo", "count": 50}))
            .unwrap();
        assert!(matches.is_empty());
    }
}
