//! Column-major form of one attribute, built when a batch is committed.

use bitmarshal::value::{ColumnValues, TaggedValue, ValueKind};

use crate::error::{BatchError, BatchResult};

/// All rows' values for one attribute: one kind, one validity flag per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub kind: ValueKind,
    /// Unit of the first valid value that carries one.
    pub unit: Option<String>,
    pub validity: Vec<bool>,
    pub values: ColumnValues,
}

impl Column {
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Builds a `kind` column from per-row cells. Absent and invalid cells get
    /// the kind's filler and a `false` flag, whatever kind they carry; a valid
    /// cell of another kind is a [BatchError::MixedKinds].
    pub fn from_cells(
        attribute: &str,
        kind: ValueKind,
        cells: Vec<Option<TaggedValue>>,
    ) -> BatchResult<Self> {
        let mut validity = Vec::with_capacity(cells.len());
        let mut values = ColumnValues::with_capacity(kind, cells.len());
        let mut unit = None;

        for (row, cell) in cells.into_iter().enumerate() {
            let mixed = |found| BatchError::MixedKinds {
                attribute: attribute.to_string(),
                expected: kind,
                found,
                row,
            };

            match cell {
                Some(value) if value.is_valid() && value.kind() != kind => {
                    return Err(mixed(value.kind()));
                }
                Some(value) if value.is_valid() => {
                    let (value, _, value_unit) = value.into_parts();
                    if unit.is_none() {
                        unit = value_unit;
                    }
                    values.push(value).map_err(|v| mixed(v.kind()))?;
                    validity.push(true);
                }
                _ => {
                    values.push_filler();
                    validity.push(false);
                }
            }
        }

        Ok(Self {
            kind,
            unit,
            validity,
            values,
        })
    }
}

/// Kind of the first valid cell. `None` means the column is entirely null and
/// is not submitted.
pub fn leading_kind(cells: &[Option<TaggedValue>]) -> Option<ValueKind> {
    cells
        .iter()
        .flatten()
        .find(|cell| cell.is_valid())
        .map(TaggedValue::kind)
}

#[cfg(test)]
mod tests {
    use bitmarshal::value::Value;

    use super::*;

    #[test]
    fn test_fillers_for_missing_and_null() {
        let cells = vec![
            Some(TaggedValue::new("a")),
            None,
            Some(TaggedValue::nullable(Some(""))),
            Some(TaggedValue::new("d")),
        ];
        let column = Column::from_cells("name", ValueKind::String, cells).unwrap();

        assert_eq!(column.validity, vec![true, false, false, true]);
        assert_eq!(
            column.values,
            ColumnValues::String(vec![
                "a".to_string(),
                String::new(),
                String::new(),
                "d".to_string()
            ])
        );
    }

    #[test]
    fn test_invalid_payload_is_replaced_by_filler() {
        let cells = vec![Some(TaggedValue::with_validity(42i64, false))];
        let column = Column::from_cells("n", ValueKind::Long, cells).unwrap();
        assert_eq!(column.values, ColumnValues::Long(vec![0]));
        assert_eq!(column.validity, vec![false]);
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        let cells = vec![Some(TaggedValue::new(1i32)), None, Some(TaggedValue::new(2i64))];
        assert_eq!(
            Column::from_cells("x", ValueKind::Int, cells),
            Err(BatchError::MixedKinds {
                attribute: "x".to_string(),
                expected: ValueKind::Int,
                found: ValueKind::Long,
                row: 2
            })
        );
    }

    #[test]
    fn test_null_cell_of_other_kind_is_filler() {
        let cells = vec![
            Some(TaggedValue::null(ValueKind::Long)),
            Some(TaggedValue::new(7i32)),
        ];
        assert_eq!(leading_kind(&cells), Some(ValueKind::Int));

        let column = Column::from_cells("x", ValueKind::Int, cells).unwrap();
        assert_eq!(column.validity, vec![false, true]);
        assert_eq!(column.values, ColumnValues::Int(vec![0, 7]));
    }

    #[test]
    fn test_unit_from_first_valid_value() {
        let cells = vec![
            Some(TaggedValue::null(ValueKind::Double).with_unit("s")),
            Some(TaggedValue::new(1.0f64)),
            Some(TaggedValue::new(2.0f64).with_unit("ms")),
        ];
        let column = Column::from_cells("t", ValueKind::Double, cells).unwrap();
        assert_eq!(column.unit.as_deref(), Some("ms"));
        assert_eq!(column.len(), 3);
    }

    #[test]
    fn test_sequence_column() {
        let cells = vec![Some(TaggedValue::new(vec![1.0f64, 2.0])), None];
        let column = Column::from_cells("samples", ValueKind::DoubleSeq, cells).unwrap();
        assert_eq!(
            column.values,
            ColumnValues::DoubleSeq(vec![vec![1.0, 2.0], vec![]])
        );
    }

    #[test]
    fn test_leading_kind() {
        assert_eq!(leading_kind(&[None, None]), None);
        assert_eq!(
            leading_kind(&[Some(TaggedValue::null(ValueKind::Int)), None]),
            None
        );
        assert_eq!(
            leading_kind(&[
                Some(TaggedValue::null(ValueKind::Int)),
                Some(TaggedValue::new(Value::Short(3)))
            ]),
            Some(ValueKind::Short)
        );
    }
}
