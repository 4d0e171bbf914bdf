use std::hash::{Hash, Hasher};

use serde_json::Value as JsonValue;

use crate::error::AdapterError;
use crate::results::{Row, RowValues};

/// Index method assumed when a definition omits one. YugabyteDB builds LSM
/// indexes rather than btrees.
pub const DEFAULT_INDEX_METHOD: &str = "lsm";

/// One index on a materialized view.
///
/// The name is carried for rendering DDL but excluded from identity: two
/// configs describe the same index when they agree on columns
/// (case-insensitive, order-insensitive), uniqueness, method, and
/// predicate. That identity is what the change detection keys on.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Server-assigned or rendered name; ignored by equality and hashing.
    pub name: Option<String>,
    /// Columns in declared order.
    pub columns: Vec<String>,
    pub unique: bool,
    /// Index method; None falls back to [`DEFAULT_INDEX_METHOD`].
    pub method: Option<String>,
    /// Partial-index filter expression.
    pub predicate: Option<String>,
}

impl IndexConfig {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            name: None,
            columns,
            unique: false,
            method: None,
            predicate: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Build from one catalog introspection row. Expected columns: `name`,
    /// `column_names` (comma-separated), `unique`, `method`, and optionally
    /// `predicate`.
    ///
    /// # Errors
    /// `AdapterError::RuntimeError` when the column list is missing or empty.
    pub fn from_introspection_row(row: &Row) -> Result<Self, AdapterError> {
        let columns: Vec<String> = row
            .get("column_names")
            .and_then(RowValues::as_text)
            .map(|joined| {
                joined
                    .split(',')
                    .map(|column| column.trim().to_string())
                    .filter(|column| !column.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if columns.is_empty() {
            return Err(AdapterError::RuntimeError(
                "index snapshot row is missing its column list".to_string(),
            ));
        }

        Ok(Self {
            name: row
                .get("name")
                .and_then(RowValues::as_text)
                .map(ToString::to_string),
            columns,
            unique: row
                .get("unique")
                .and_then(RowValues::as_bool)
                .unwrap_or(false),
            method: row
                .get("method")
                .and_then(RowValues::as_text)
                .map(ToString::to_string),
            predicate: row
                .get("predicate")
                .and_then(RowValues::as_text)
                .filter(|predicate| !predicate.is_empty())
                .map(ToString::to_string),
        })
    }

    /// Build from one entry of a model's `indexes` list. Recognized keys:
    /// `columns` (required), `unique`, `type`, `predicate`.
    ///
    /// # Errors
    /// `AdapterError::RuntimeError` when `columns` is missing, empty, or not
    /// a list of strings.
    pub fn from_model_value(value: &JsonValue) -> Result<Self, AdapterError> {
        let columns: Option<Vec<String>> = value
            .get("columns")
            .and_then(JsonValue::as_array)
            .and_then(|list| {
                list.iter()
                    .map(|entry| entry.as_str().map(ToString::to_string))
                    .collect()
            });
        let columns = match columns {
            Some(columns) if !columns.is_empty() => columns,
            _ => {
                return Err(AdapterError::RuntimeError(
                    "index definition needs a non-empty `columns` list of strings".to_string(),
                ));
            }
        };

        Ok(Self {
            name: None,
            columns,
            unique: value
                .get("unique")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            method: value
                .get("type")
                .and_then(JsonValue::as_str)
                .map(ToString::to_string),
            predicate: value
                .get("predicate")
                .and_then(JsonValue::as_str)
                .map(ToString::to_string),
        })
    }

    fn normalized_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| column.to_lowercase())
            .collect();
        columns.sort();
        columns
    }

    fn method_key(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_INDEX_METHOD)
    }
}

impl PartialEq for IndexConfig {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_columns() == other.normalized_columns()
            && self.unique == other.unique
            && self.method_key() == other.method_key()
            && self.predicate == other.predicate
    }
}

impl Eq for IndexConfig {}

impl Hash for IndexConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_columns().hash(state);
        self.unique.hash(state);
        self.method_key().hash(state);
        self.predicate.hash(state);
    }
}

/// Direction of one index change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Create,
    Drop,
}

/// A single index change for the DDL executor: drop this shape, or create
/// that one. Never an in-place alter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexConfigChange {
    pub action: ChangeAction,
    pub context: IndexConfig,
}

impl IndexConfigChange {
    #[must_use]
    pub fn new(action: ChangeAction, context: IndexConfig) -> Self {
        Self { action, context }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn name_is_not_part_of_identity() {
        let named = IndexConfig::new(cols(&["a", "b"])).name("idx_ab");
        let anonymous = IndexConfig::new(cols(&["a", "b"]));
        assert_eq!(named, anonymous);
    }

    #[test]
    fn column_case_and_order_do_not_matter() {
        let one = IndexConfig::new(cols(&["B", "a"]));
        let other = IndexConfig::new(cols(&["a", "b"]));
        assert_eq!(one, other);
    }

    #[test]
    fn unique_flag_changes_identity() {
        let plain = IndexConfig::new(cols(&["a"]));
        let unique = IndexConfig::new(cols(&["a"])).unique(true);
        assert_ne!(plain, unique);
    }

    #[test]
    fn missing_method_means_engine_default() {
        let implicit = IndexConfig::new(cols(&["a"]));
        let explicit = IndexConfig::new(cols(&["a"])).method(DEFAULT_INDEX_METHOD);
        let btree = IndexConfig::new(cols(&["a"])).method("btree");
        assert_eq!(implicit, explicit);
        assert_ne!(implicit, btree);
    }

    #[test]
    fn parse_model_entry() {
        let parsed = IndexConfig::from_model_value(&serde_json::json!({
            "columns": ["customer_id", "order_date"],
            "unique": true,
            "type": "lsm",
        }))
        .unwrap();
        assert_eq!(parsed.columns, cols(&["customer_id", "order_date"]));
        assert!(parsed.unique);
        assert_eq!(parsed.method.as_deref(), Some("lsm"));
        assert_eq!(parsed.predicate, None);
    }

    #[test]
    fn model_entry_without_columns_is_rejected() {
        let err = IndexConfig::from_model_value(&serde_json::json!({"unique": true})).unwrap_err();
        assert!(matches!(err, AdapterError::RuntimeError(_)));

        let err = IndexConfig::from_model_value(&serde_json::json!({"columns": []})).unwrap_err();
        assert!(matches!(err, AdapterError::RuntimeError(_)));
    }

    #[test]
    fn parse_introspection_row() {
        let row = Row::new(
            Arc::new(vec![
                "name".to_string(),
                "column_names".to_string(),
                "unique".to_string(),
                "method".to_string(),
            ]),
            vec![
                RowValues::Text("idx_orders".into()),
                RowValues::Text("customer_id, order_date".into()),
                RowValues::Bool(false),
                RowValues::Text("lsm".into()),
            ],
        );
        let parsed = IndexConfig::from_introspection_row(&row).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("idx_orders"));
        assert_eq!(parsed.columns, cols(&["customer_id", "order_date"]));
        assert!(!parsed.unique);
        assert_eq!(parsed.method.as_deref(), Some("lsm"));
    }
}
