use std::fmt;

/// Column metadata with YugabyteDB's rendering of string types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub column: String,
    pub dtype: String,
    pub char_size: Option<u32>,
}

impl Column {
    /// Size assumed for string columns whose catalog entry carries none.
    pub const DEFAULT_STRING_SIZE: u32 = 256;

    #[must_use]
    pub fn new(column: impl Into<String>, dtype: impl Into<String>, char_size: Option<u32>) -> Self {
        Self {
            column: column.into(),
            dtype: dtype.into(),
            char_size,
        }
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(
            self.dtype.to_lowercase().as_str(),
            "text" | "character varying" | "varchar" | "string"
        )
    }

    /// Rendered type for DDL. Bare `text` and unsized `character varying`
    /// pass through untouched; other string types get an explicit size.
    #[must_use]
    pub fn data_type(&self) -> String {
        let lower = self.dtype.to_lowercase();
        if lower == "text" || (lower == "character varying" && self.char_size.is_none()) {
            return self.dtype.clone();
        }
        if self.is_string() {
            let size = self.char_size.unwrap_or(Self::DEFAULT_STRING_SIZE);
            return format!("character varying({size})");
        }
        self.dtype.clone()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.data_type())
    }
}
