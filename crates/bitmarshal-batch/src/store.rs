use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use bitmarshal::value::ValueKind;

use crate::column::Column;
use crate::error::{StoreError, StoreResult};

/// Store-generated identifier of an inserted row.
pub type RowId = u64;

/// One atomic insert: every column holds exactly `row_count` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    pub entity: String,
    pub row_count: usize,
    pub columns: BTreeMap<String, Column>,
}

/// Typed store receiving column-major batches.
///
/// An insert is all-or-nothing: on error no row of the request is stored.
pub trait Store: Send + Sync {
    /// Inserts the request's rows and returns one identifier per row, in row order.
    fn insert_rows(&self, request: &InsertRequest) -> StoreResult<Vec<RowId>>;
}

#[derive(Default)]
struct MemoryState {
    next_ids: HashMap<String, RowId>,
    requests: Vec<InsertRequest>,
}

/// In-memory, HashMap-based store.
///
/// Intended for tests and embedding. Identifiers count up from 1 per entity;
/// every accepted request is kept for inspection.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    unsupported: HashSet<ValueKind>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects columns of `kind` with [StoreError::UnsupportedKind].
    pub fn without_kind(mut self, kind: ValueKind) -> Self {
        self.unsupported.insert(kind);
        self
    }

    /// All accepted requests, oldest first.
    pub fn requests(&self) -> Vec<InsertRequest> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .len()
    }

    fn check(&self, request: &InsertRequest) -> StoreResult<()> {
        for (attribute, column) in &request.columns {
            if self.unsupported.contains(&column.kind) {
                return Err(StoreError::UnsupportedKind {
                    attribute: attribute.clone(),
                    kind: column.kind,
                });
            }
            if column.values.kind() != column.kind {
                return Err(StoreError::InvalidParameter(format!(
                    "column {attribute:?} declares {} but holds {}",
                    column.kind,
                    column.values.kind()
                )));
            }
            if column.validity.len() != request.row_count
                || column.values.len() != request.row_count
            {
                return Err(StoreError::InvalidParameter(format!(
                    "column {attribute:?} has {} values for {} rows",
                    column.values.len(),
                    request.row_count
                )));
            }
        }

        Ok(())
    }
}

impl Store for MemoryStore {
    fn insert_rows(&self, request: &InsertRequest) -> StoreResult<Vec<RowId>> {
        self.check(request)?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let next = state.next_ids.entry(request.entity.clone()).or_insert(1);
        let first = *next;
        *next += request.row_count as RowId;

        state.requests.push(request.clone());
        tracing::debug!(
            entity = %request.entity,
            rows = request.row_count,
            first_id = first,
            "stored rows"
        );

        Ok((first..first + request.row_count as RowId).collect())
    }
}

#[cfg(test)]
mod tests {
    use bitmarshal::value::ColumnValues;

    use super::*;

    fn int_column(values: Vec<i32>) -> Column {
        Column {
            kind: ValueKind::Int,
            unit: None,
            validity: vec![true; values.len()],
            values: ColumnValues::Int(values),
        }
    }

    fn request(entity: &str, rows: usize, column: Column) -> InsertRequest {
        InsertRequest {
            entity: entity.to_string(),
            row_count: rows,
            columns: BTreeMap::from([("x".to_string(), column)]),
        }
    }

    #[test]
    fn test_ids_are_sequential_per_entity() {
        let store = MemoryStore::new();
        assert_eq!(
            store.insert_rows(&request("a", 2, int_column(vec![1, 2]))),
            Ok(vec![1, 2])
        );
        assert_eq!(
            store.insert_rows(&request("a", 1, int_column(vec![3]))),
            Ok(vec![3])
        );
        assert_eq!(
            store.insert_rows(&request("b", 1, int_column(vec![4]))),
            Ok(vec![1])
        );
        assert_eq!(store.request_count(), 3);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let store = MemoryStore::new();
        let result = store.insert_rows(&request("a", 3, int_column(vec![1, 2])));
        assert!(matches!(result, Err(StoreError::InvalidParameter(_))));
        assert_eq!(store.request_count(), 0);
    }

    #[test]
    fn test_unsupported_kind() {
        let store = MemoryStore::new().without_kind(ValueKind::Int);
        assert_eq!(
            store.insert_rows(&request("a", 1, int_column(vec![1]))),
            Err(StoreError::UnsupportedKind {
                attribute: "x".to_string(),
                kind: ValueKind::Int
            })
        );
    }

    #[test]
    fn test_rows_without_columns() {
        let store = MemoryStore::new();
        let request = InsertRequest {
            entity: "a".to_string(),
            row_count: 2,
            columns: BTreeMap::new(),
        };
        assert_eq!(store.insert_rows(&request), Ok(vec![1, 2]));
    }
}
