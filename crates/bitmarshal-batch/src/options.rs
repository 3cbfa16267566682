/// Configuration options for a [crate::writer::BatchWriter].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BatchWriteOptions {
    /// Start row 0 implicitly when a value is set before any `new_row` call.
    /// When false, that call fails with [crate::error::BatchError::NoCurrentRow].
    pub auto_start_row: bool,
    /// Maximum number of rows a batch may hold.
    pub max_rows: Option<usize>,
}

impl Default for BatchWriteOptions {
    fn default() -> Self {
        Self {
            auto_start_row: true,
            max_rows: None,
        }
    }
}

impl BatchWriteOptions {
    pub fn with_auto_start_row(mut self, auto_start_row: bool) -> Self {
        self.auto_start_row = auto_start_row;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_from_json() {
        let options: BatchWriteOptions = serde_json::from_str(r#"{ "max_rows": 500 }"#).unwrap();
        assert_eq!(options, BatchWriteOptions::default().with_max_rows(500));
    }
}
