//! Column discovery across all records
//!
//! The first pass over the forest: every record is flattened with the shared
//! rule and the column names are unioned in first-seen order. The resulting
//! [`ColumnSchema`] is the header of the output and the order every row is
//! rendered in.

use crate::error::Result;
use crate::flatten::rule::FlattenRule;
use crate::flatten::types::FlattenConfig;
use crate::tree::XmlNode;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Ordered, de-duplicated column list discovered from a set of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: Vec<String>,

    #[serde(skip)]
    seen: HashSet<String>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        ColumnSchema::default()
    }

    /// Discover the columns of every record, in record order
    ///
    /// # Arguments
    /// * `records` - The top-level records of the forest
    /// * `config` - Flattening configuration (marker tags, separator)
    pub fn discover(records: &[XmlNode], config: &FlattenConfig) -> Result<Self> {
        let rule = FlattenRule::new(config);
        let mut schema = ColumnSchema::new();

        for record in records {
            schema.add_record(&rule, record)?;
        }

        debug!(
            "discovered {} column(s) across {} record(s)",
            schema.len(),
            records.len()
        );
        Ok(schema)
    }

    /// Union the columns of one record into the schema
    pub fn add_record(&mut self, rule: &FlattenRule<'_>, record: &XmlNode) -> Result<()> {
        for field in rule.flatten(record)? {
            self.push(field.column);
        }
        Ok(())
    }

    /// Append a column unless it is already known
    pub fn push(&mut self, column: String) -> bool {
        if self.seen.contains(&column) {
            return false;
        }
        self.seen.insert(column.clone());
        self.columns.push(column);
        true
    }

    /// Append the columns of another schema, keeping this schema's order
    /// first. Merging per-record schemas in record order gives the same
    /// result as discovering them in one pass.
    pub fn merge(&mut self, other: ColumnSchema) {
        for column in other.columns {
            self.push(column);
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.seen.contains(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
