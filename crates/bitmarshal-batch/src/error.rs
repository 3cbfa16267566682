use bitmarshal::value::ValueKind;

/// Errors from schema catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("unknown attribute {attribute:?} on entity {entity:?}")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("unknown enumeration: {0}")]
    UnknownEnumeration(String),

    #[error("enumeration {enumeration:?} has no literal {literal:?}")]
    UnknownEnumLiteral {
        enumeration: String,
        literal: String,
    },

    #[error("enumeration {enumeration:?} has no code {code}")]
    UnknownEnumCode { enumeration: String, code: i32 },

    /// The loader behind the catalog could not reach its source.
    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors reported by a [crate::store::Store].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported kind {kind} for attribute {attribute:?}")]
    UnsupportedKind { attribute: String, kind: ValueKind },

    #[error("store connectivity error: {0}")]
    Connectivity(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from accumulating or committing a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// `execute` was called on a batch without rows.
    #[error("no values provided")]
    NoValues,

    /// `execute` was called on a batch holding more than one row.
    #[error("batch holds {0} rows, must use batch form")]
    MultipleRows(usize),

    /// A value was set before any row was started.
    #[error("no current row")]
    NoCurrentRow,

    #[error("batch is full ({0} rows)")]
    BatchFull(usize),

    /// One attribute carries different kinds across the rows of a batch.
    #[error("attribute {attribute:?} is {expected} but row {row} holds {found}")]
    MixedKinds {
        attribute: String,
        expected: ValueKind,
        found: ValueKind,
        row: usize,
    },

    /// The supplied kind differs from the kind the catalog declares.
    #[error("attribute {attribute:?} is declared {declared} but {supplied} was supplied")]
    KindMismatch {
        attribute: String,
        declared: ValueKind,
        supplied: ValueKind,
    },

    /// The store returned a different number of identifiers than rows submitted.
    #[error("store returned {actual} identifiers for {expected} rows")]
    IdentifierCount { expected: usize, actual: usize },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
