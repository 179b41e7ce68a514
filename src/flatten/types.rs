use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the flattening process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// Tags allowed for top-level records (case-insensitive)
    pub record_tags: Vec<String>,

    /// Repeated siblings with this tag are told apart by `name_attribute`
    pub named_variant_tag: String,

    /// Attribute carrying the column suffix of a named variant
    pub name_attribute: String,

    /// A parent with this tag is told apart from its siblings by
    /// `index_attribute`
    pub positional_variant_tag: String,

    /// Attribute carrying the position of a positional variant
    pub index_attribute: String,

    /// Separator between the parts of a column name
    pub separator: String,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            record_tags: vec![String::from("Event")],
            named_variant_tag: String::from("Data"),
            name_attribute: String::from("Name"),
            positional_variant_tag: String::from("Substitution"),
            index_attribute: String::from("index"),
            separator: String::from("_"),
        }
    }
}

/// One flattened `(column, value)` pair, borrowing its raw value from the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatField<'a> {
    pub column: String,
    pub value: &'a str,
}

/// The values of one record, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub values: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    /// Store a value; a later value for the same column replaces the earlier one
    pub fn insert(&mut self, column: String, value: String) {
        self.values.insert(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Values in the order of `columns`, empty for columns this row lacks
    pub fn values_in<'a>(&'a self, columns: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        columns.iter().map(move |c| self.get(c).unwrap_or(""))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
