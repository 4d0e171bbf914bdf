use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::AdapterError;
use crate::relation_configs::{
    MAX_CHARACTERS_IN_IDENTIFIER, MaterializedViewConfig, MaterializedViewConfigChangeCollection,
};
use crate::results::ResultSet;

/// Kinds of relation the adapter manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    Table,
    View,
    MaterializedView,
    Cte,
    External,
}

impl RelationType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Table => "table",
            RelationType::View => "view",
            RelationType::MaterializedView => "materialized_view",
            RelationType::Cte => "cte",
            RelationType::External => "external",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A database/schema/identifier triple with an optional relation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub identifier: Option<String>,
    pub relation_type: Option<RelationType>,
}

impl Relation {
    /// Build a relation, enforcing the server's identifier length limit.
    ///
    /// The check only applies when the relation type is known; unresolved
    /// references pass through so they can still be rendered in messages.
    ///
    /// # Errors
    /// `AdapterError::RuntimeError` when the identifier is too long.
    pub fn try_new(
        database: Option<String>,
        schema: Option<String>,
        identifier: Option<String>,
        relation_type: Option<RelationType>,
    ) -> Result<Self, AdapterError> {
        if let Some(name) = &identifier {
            if relation_type.is_some() && name.chars().count() > MAX_CHARACTERS_IN_IDENTIFIER {
                return Err(AdapterError::RuntimeError(format!(
                    "Relation name '{name}' is longer than {MAX_CHARACTERS_IN_IDENTIFIER} characters"
                )));
            }
        }
        Ok(Self {
            database,
            schema,
            identifier,
            relation_type,
        })
    }

    #[must_use]
    pub fn max_name_length() -> usize {
        MAX_CHARACTERS_IN_IDENTIFIER
    }

    /// Whether `ALTER ... RENAME` works for this relation's type.
    #[must_use]
    pub fn is_renameable(&self) -> bool {
        matches!(
            self.relation_type,
            Some(RelationType::Table | RelationType::View | RelationType::MaterializedView)
        )
    }

    /// Whether `CREATE OR REPLACE` works for this relation's type.
    #[must_use]
    pub fn is_replaceable(&self) -> bool {
        matches!(
            self.relation_type,
            Some(RelationType::Table | RelationType::View)
        )
    }

    /// Quoted dotted path, e.g. `"analytics"."marts"."mv_orders"`.
    #[must_use]
    pub fn render(&self) -> String {
        [&self.database, &self.schema, &self.identifier]
            .iter()
            .filter_map(|part| part.as_deref())
            .map(|part| format!("\"{part}\""))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Compute the index changes needed to line this materialized view up
    /// with its model definition.
    ///
    /// # Errors
    /// Propagates construction failures from either snapshot or model.
    pub fn materialized_view_config_changes(
        &self,
        relation_results: &ResultSet,
        model: &JsonValue,
    ) -> Result<Option<MaterializedViewConfigChangeCollection>, AdapterError> {
        let identifier = self.identifier.as_deref().unwrap_or_default();
        let existing = MaterializedViewConfig::from_relation_results(identifier, relation_results)?;
        let desired = MaterializedViewConfig::from_model(identifier, model)?;
        Ok(existing.diff(&desired))
    }
}
