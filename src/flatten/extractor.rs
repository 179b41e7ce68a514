use crate::error::Result;
use crate::flatten::rule::{sanitize_value, FlattenRule};
use crate::flatten::types::{FlattenConfig, Row};
use crate::tree::XmlNode;

/// Turns records into rows of sanitized values
pub struct RowFlattener {
    config: FlattenConfig,
}

impl RowFlattener {
    pub fn new(config: FlattenConfig) -> Self {
        RowFlattener { config }
    }

    /// Flatten one record; a column produced twice keeps the later value
    pub fn flatten(&self, record: &XmlNode) -> Result<Row> {
        let rule = FlattenRule::new(&self.config);
        let mut row = Row::new();

        for field in rule.flatten(record)? {
            row.insert(field.column, sanitize_value(field.value).into_owned());
        }

        Ok(row)
    }

    /// Flatten every record, one row per record in record order
    pub fn flatten_all(&self, records: &[XmlNode]) -> Result<Vec<Row>> {
        records.iter().map(|record| self.flatten(record)).collect()
    }
}
