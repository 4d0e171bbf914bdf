//! Value objects describing relation configuration, plus the change
//! detection used for materialized views.

mod index;
mod materialized_view;

pub use index::{ChangeAction, DEFAULT_INDEX_METHOD, IndexConfig, IndexConfigChange};
pub use materialized_view::{MaterializedViewConfig, MaterializedViewConfigChangeCollection};

/// Longest identifier the server stores without truncation.
pub const MAX_CHARACTERS_IN_IDENTIFIER: usize = 63;
