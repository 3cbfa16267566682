//! # bitmarshal-batch
//!
//! Row-oriented batch writing of [bitmarshal::value::TaggedValue]s into a
//! column-major typed store.
//!
//! A [writer::BatchWriter] accumulates rows for one entity type. On commit the
//! rows are transposed into one [column::Column] per attribute, checked against
//! a [catalog::SchemaCatalog], and handed to a [store::Store] in a single call.
//!
//! ## Example
//!
//! ```
//! use bitmarshal::value::{TaggedValue, ValueKind};
//! use bitmarshal_batch::catalog::{CachedCatalog, EntityMeta, StaticLoader};
//! use bitmarshal_batch::store::MemoryStore;
//! use bitmarshal_batch::writer::BatchWriter;
//!
//! let catalog = CachedCatalog::new(StaticLoader::new().with_entity(
//!     EntityMeta::new("sample")
//!         .with_attribute("x", ValueKind::Int)
//!         .with_attribute("y", ValueKind::Double),
//! ));
//! let store = MemoryStore::new();
//!
//! let mut writer = BatchWriter::new("sample", &catalog, &store);
//! writer.new_row().unwrap();
//! writer.set_value("x", TaggedValue::new(5i32)).unwrap();
//! writer.new_row().unwrap();
//! writer.set_value("y", TaggedValue::null(ValueKind::Double)).unwrap();
//!
//! assert_eq!(writer.execute_batch().unwrap(), vec![1, 2]);
//! let request = &store.requests()[0];
//! assert_eq!(request.columns["x"].validity, vec![true, false]);
//! assert!(!request.columns.contains_key("y"));
//! ```

pub mod catalog;
pub mod column;
pub mod error;
pub mod options;
pub mod row_batch;
pub mod store;
pub mod writer;

pub use error::{BatchError, BatchResult, CatalogError, StoreError};
pub use options::BatchWriteOptions;
pub use writer::{BatchState, BatchWriter};
