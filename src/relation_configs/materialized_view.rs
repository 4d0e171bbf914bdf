use std::collections::HashSet;

use serde_json::Value as JsonValue;

use super::index::{ChangeAction, IndexConfig, IndexConfigChange};
use crate::error::AdapterError;
use crate::results::ResultSet;

/// Index layout of one materialized view, either as it exists on the
/// server or as the model declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedViewConfig {
    pub identifier: String,
    pub indexes: HashSet<IndexConfig>,
}

impl MaterializedViewConfig {
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        indexes: impl IntoIterator<Item = IndexConfig>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            indexes: indexes.into_iter().collect(),
        }
    }

    /// Snapshot constructor: one introspection row per index.
    ///
    /// # Errors
    /// Propagates `AdapterError::RuntimeError` from malformed rows.
    pub fn from_relation_results(
        identifier: impl Into<String>,
        results: &ResultSet,
    ) -> Result<Self, AdapterError> {
        let indexes = results
            .results
            .iter()
            .map(IndexConfig::from_introspection_row)
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(Self {
            identifier: identifier.into(),
            indexes,
        })
    }

    /// Model constructor: reads the `indexes` list from the model's config
    /// value. A missing or null list means no indexes.
    ///
    /// # Errors
    /// `AdapterError::RuntimeError` when `indexes` is not a list or an entry
    /// is malformed.
    pub fn from_model(
        identifier: impl Into<String>,
        model: &JsonValue,
    ) -> Result<Self, AdapterError> {
        let indexes = match model.get("indexes") {
            None | Some(JsonValue::Null) => HashSet::new(),
            Some(JsonValue::Array(entries)) => entries
                .iter()
                .map(IndexConfig::from_model_value)
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(AdapterError::RuntimeError(
                    "model config `indexes` must be a list".to_string(),
                ));
            }
        };
        Ok(Self {
            identifier: identifier.into(),
            indexes,
        })
    }

    /// Structural diff against the desired layout.
    ///
    /// Indexes present on both sides produce nothing. A changed property
    /// makes two configs unequal, so the old shape shows up as a drop and
    /// the new shape as a create. Returns None when there is nothing to do,
    /// so callers can treat presence as "needs work".
    #[must_use]
    pub fn diff(&self, desired: &Self) -> Option<MaterializedViewConfigChangeCollection> {
        let drops = self
            .indexes
            .difference(&desired.indexes)
            .cloned()
            .map(|index| IndexConfigChange::new(ChangeAction::Drop, index));
        let creates = desired
            .indexes
            .difference(&self.indexes)
            .cloned()
            .map(|index| IndexConfigChange::new(ChangeAction::Create, index));

        let indexes: HashSet<IndexConfigChange> = drops.chain(creates).collect();
        if indexes.is_empty() {
            None
        } else {
            Some(MaterializedViewConfigChangeCollection { indexes })
        }
    }
}

/// The changes needed to move one materialized view to its desired layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedViewConfigChangeCollection {
    pub indexes: HashSet<IndexConfigChange>,
}

impl MaterializedViewConfigChangeCollection {
    /// Always true for collections produced by `diff`, which returns None
    /// instead of an empty collection.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.indexes.is_empty()
    }
}
