//! Flattening records into a single table
//!
//! Two passes share one rule: [`ColumnSchema::discover`] walks every record to
//! collect the superset of columns, then [`RowFlattener`] walks each record
//! again to produce its values. [`RowWriter`] renders the result.

pub mod types;
pub mod rule;
pub mod plan;
pub mod extractor;
pub mod writer;

pub use types::{FlatField, FlattenConfig, Row};
pub use rule::{sanitize_value, FlattenRule};
pub use plan::ColumnSchema;
pub use extractor::RowFlattener;
pub use writer::{render_header, render_row, RowWriter, WriterConfig};
