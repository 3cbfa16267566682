//! Batch writer: accumulates rows for one entity type and commits them to a
//! [Store] as a single column-major insert.

use std::collections::BTreeMap;

use bitmarshal::value::TaggedValue;

use crate::catalog::SchemaCatalog;
use crate::column::{self, Column};
use crate::error::{BatchError, BatchResult};
use crate::options::BatchWriteOptions;
use crate::row_batch::RowBatch;
use crate::store::{InsertRequest, RowId, Store};

/// Accumulation state of a writer. A committed writer has been consumed by
/// [BatchWriter::execute] or [BatchWriter::execute_batch] and cannot be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Empty,
    Accumulating,
}

/// Builds rows for one entity type and submits them in one store call.
///
/// Values set with [set_value](BatchWriter::set_value) go to the most recently
/// started row. With the default options, setting a value before any
/// [new_row](BatchWriter::new_row) starts row 0.
pub struct BatchWriter<'a, C: ?Sized, S: ?Sized> {
    entity: String,
    catalog: &'a C,
    store: &'a S,
    options: BatchWriteOptions,
    batch: RowBatch,
}

impl<'a, C, S> BatchWriter<'a, C, S>
where
    C: SchemaCatalog + ?Sized,
    S: Store + ?Sized,
{
    pub fn new(entity: impl Into<String>, catalog: &'a C, store: &'a S) -> Self {
        Self {
            entity: entity.into(),
            catalog,
            store,
            options: BatchWriteOptions::default(),
            batch: RowBatch::new(),
        }
    }

    pub fn with_options(mut self, options: BatchWriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn state(&self) -> BatchState {
        if self.batch.is_empty() {
            BatchState::Empty
        } else {
            BatchState::Accumulating
        }
    }

    pub fn row_count(&self) -> usize {
        self.batch.row_count()
    }

    pub fn batch(&self) -> &RowBatch {
        &self.batch
    }

    /// Starts a new row; later values target it. Returns its index.
    pub fn new_row(&mut self) -> BatchResult<usize> {
        if let Some(max) = self.options.max_rows {
            if self.batch.row_count() >= max {
                return Err(BatchError::BatchFull(max));
            }
        }

        Ok(self.batch.push_row())
    }

    /// Sets `attribute` on the current row.
    pub fn set_value(&mut self, attribute: impl Into<String>, value: TaggedValue) -> BatchResult<()> {
        if self.batch.is_empty() && self.options.auto_start_row {
            self.new_row()?;
        }

        self.batch.set(attribute.into(), value)
    }

    /// Resolves `literal` in `enumeration` through the catalog and sets the code.
    pub fn set_enum_literal(
        &mut self,
        attribute: impl Into<String>,
        enumeration: &str,
        literal: &str,
    ) -> BatchResult<()> {
        let code = self.catalog.resolve_enum_code(enumeration, literal)?;
        self.set_value(attribute, TaggedValue::enumeration(code))
    }

    /// Starts a row and sets every given value on it.
    pub fn append_row<I, K>(&mut self, values: I) -> BatchResult<usize>
    where
        I: IntoIterator<Item = (K, TaggedValue)>,
        K: Into<String>,
    {
        let index = self.new_row()?;
        for (attribute, value) in values {
            self.batch.set(attribute.into(), value)?;
        }

        Ok(index)
    }

    /// Commits a batch of exactly one row and returns its identifier.
    pub fn execute(self) -> BatchResult<RowId> {
        match self.batch.row_count() {
            0 => Err(BatchError::NoValues),
            1 => {
                let ids = self.execute_batch()?;
                ids.into_iter().next().ok_or(BatchError::NoValues)
            }
            n => Err(BatchError::MultipleRows(n)),
        }
    }

    /// Transposes the rows into columns, submits them in one store call and
    /// returns one identifier per row in append order.
    ///
    /// Columns that are null on every row, and the entity's identity attribute,
    /// are left out. A batch without rows or without any value set is a no-op.
    pub fn execute_batch(self) -> BatchResult<Vec<RowId>> {
        if self.batch.is_empty() || !self.batch.has_values() {
            tracing::debug!(entity = %self.entity, "empty batch, nothing to submit");
            return Ok(Vec::new());
        }

        let row_count = self.batch.row_count();
        let mut columns = BTreeMap::new();

        for (attribute, cells) in self.batch.into_cells() {
            let Some(kind) = column::leading_kind(&cells) else {
                tracing::trace!(attribute = %attribute, "skipping all-null column");
                continue;
            };

            if self.catalog.is_identity_attribute(&self.entity, &attribute)? {
                tracing::trace!(attribute = %attribute, "skipping identity attribute");
                continue;
            }

            let declared = self.catalog.resolve_kind(&self.entity, &attribute)?;
            if declared != kind {
                return Err(BatchError::KindMismatch {
                    attribute,
                    declared,
                    supplied: kind,
                });
            }

            let column = Column::from_cells(&attribute, kind, cells)?;
            columns.insert(attribute, column);
        }

        let request = InsertRequest {
            entity: self.entity,
            row_count,
            columns,
        };

        tracing::debug!(
            entity = %request.entity,
            rows = row_count,
            columns = request.columns.len(),
            "submitting batch"
        );

        let ids = self.store.insert_rows(&request)?;
        if ids.len() != row_count {
            return Err(BatchError::IdentifierCount {
                expected: row_count,
                actual: ids.len(),
            });
        }

        Ok(ids)
    }
}
