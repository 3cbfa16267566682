//! Row-major accumulation of attribute values.

use std::collections::{BTreeMap, HashSet};

use bitmarshal::value::TaggedValue;

use crate::error::{BatchError, BatchResult};

/// One row: attribute name to value, each name at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<String, TaggedValue>,
}

impl Row {
    pub fn get(&self, attribute: &str) -> Option<&TaggedValue> {
        self.values.get(attribute)
    }

    /// Sets `attribute`, returning the value it replaces.
    pub fn set(&mut self, attribute: String, value: TaggedValue) -> Option<TaggedValue> {
        self.values.insert(attribute, value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaggedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Ordered rows plus the union of every attribute name set on any of them,
/// in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RowBatch {
    rows: Vec<Row>,
    attributes: Vec<String>,
    seen: HashSet<String>,
}

impl RowBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new row and makes it current. Returns its index.
    pub fn push_row(&mut self) -> usize {
        self.rows.push(Row::default());
        self.rows.len() - 1
    }

    /// Sets `attribute` on the current (last started) row.
    pub fn set(&mut self, attribute: String, value: TaggedValue) -> BatchResult<()> {
        let row = self.rows.last_mut().ok_or(BatchError::NoCurrentRow)?;

        if !self.seen.contains(&attribute) {
            self.seen.insert(attribute.clone());
            self.attributes.push(attribute.clone());
        }
        row.set(attribute, value);

        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any attribute was ever set on any row.
    pub fn has_values(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attributes
    }

    /// Transposes the batch: for every attribute, one cell per row in row
    /// order, `None` where the row never set it.
    pub fn into_cells(self) -> Vec<(String, Vec<Option<TaggedValue>>)> {
        let mut rows = self.rows;

        self.attributes
            .into_iter()
            .map(|attribute| {
                let cells = rows
                    .iter_mut()
                    .map(|row| row.values.remove(&attribute))
                    .collect();
                (attribute, cells)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_without_row() {
        let mut batch = RowBatch::new();
        assert_eq!(
            batch.set("x".to_string(), TaggedValue::new(1i32)),
            Err(BatchError::NoCurrentRow)
        );
        assert!(!batch.has_values());
    }

    #[test]
    fn test_attributes_union_in_first_seen_order() {
        let mut batch = RowBatch::new();
        batch.push_row();
        batch.set("b".to_string(), TaggedValue::new(1i32)).unwrap();
        batch.push_row();
        batch.set("a".to_string(), TaggedValue::new(2i32)).unwrap();
        batch.set("b".to_string(), TaggedValue::new(3i32)).unwrap();

        assert_eq!(batch.attribute_names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.rows()[0].len(), 1);
    }

    #[test]
    fn test_set_overwrites_within_row() {
        let mut batch = RowBatch::new();
        batch.push_row();
        batch.set("x".to_string(), TaggedValue::new(1i32)).unwrap();
        batch.set("x".to_string(), TaggedValue::new(9i32)).unwrap();
        assert_eq!(batch.rows()[0].get("x"), Some(&TaggedValue::new(9i32)));
        assert_eq!(batch.attribute_names().len(), 1);
    }

    #[test]
    fn test_into_cells_fills_missing() {
        let mut batch = RowBatch::new();
        batch.push_row();
        batch.set("x".to_string(), TaggedValue::new(5i32)).unwrap();
        batch.push_row();
        batch.push_row();
        batch.set("y".to_string(), TaggedValue::new(true)).unwrap();

        let cells = batch.into_cells();
        assert_eq!(
            cells,
            vec![
                (
                    "x".to_string(),
                    vec![Some(TaggedValue::new(5i32)), None, None]
                ),
                (
                    "y".to_string(),
                    vec![None, None, Some(TaggedValue::new(true))]
                ),
            ]
        );
    }
}
