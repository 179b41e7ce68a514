//! The flattening rule shared by column discovery and row building
//!
//! Every leaf element of a record (an element without child elements) turns
//! into one or more `(column, value)` pairs:
//!
//! - a self-closing leaf with attributes (`<Provider Name="x"/>`) is an
//!   attribute bag and yields `{leaf}_{attribute}` for each attribute
//! - repeated named-variant siblings (`<Data Name="x">`) yield
//!   `{parent}_{Name}`
//! - the single child of a positional-variant parent
//!   (`<Substitution index="0"><String>`) yields `{parent}_index_{index}_{leaf}`
//! - anything else yields `{parent}_{leaf}`
//!
//! Discovery and row building both go through [`FlattenRule::flatten`], so a
//! row can never produce a column the discovery pass did not see.

use crate::error::{ConvertError, Result};
use crate::flatten::types::{FlatField, FlattenConfig};
use crate::tree::XmlNode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;

// CRLF first so it collapses into one space rather than two
static LINE_ENDINGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\r\n\x{0C}\x{85}\x{2028}\x{2029}]").unwrap()
});

/// Replace every line-ending sequence with a single space
pub fn sanitize_value(value: &str) -> Cow<'_, str> {
    LINE_ENDINGS.replace_all(value, " ")
}

/// Applies the flattening rule to records
pub struct FlattenRule<'c> {
    config: &'c FlattenConfig,
}

impl<'c> FlattenRule<'c> {
    pub fn new(config: &'c FlattenConfig) -> Self {
        FlattenRule { config }
    }

    /// Flatten a record into `(column, raw value)` pairs in document order
    pub fn flatten<'a>(&self, record: &'a XmlNode) -> Result<Vec<FlatField<'a>>> {
        let mut fields = Vec::new();
        self.flatten_children(record, record, &mut fields)?;
        Ok(fields)
    }

    /// `owner` is the element containing `parent`, or the record itself at
    /// the top
    fn flatten_children<'a>(
        &self,
        parent: &'a XmlNode,
        owner: &'a XmlNode,
        fields: &mut Vec<FlatField<'a>>,
    ) -> Result<()> {
        let mut sibling_counts: HashMap<&str, usize> = HashMap::new();
        for child in &parent.children {
            *sibling_counts.entry(child.name.as_str()).or_insert(0) += 1;
        }

        for child in &parent.children {
            if child.is_leaf() {
                let siblings = sibling_counts.get(child.name.as_str()).copied().unwrap_or(1);
                self.flatten_leaf(owner, parent, child, siblings, fields)?;
            } else {
                self.flatten_children(child, parent, fields)?;
            }
        }

        Ok(())
    }

    fn flatten_leaf<'a>(
        &self,
        owner: &'a XmlNode,
        parent: &'a XmlNode,
        leaf: &'a XmlNode,
        siblings: usize,
        fields: &mut Vec<FlatField<'a>>,
    ) -> Result<()> {
        if leaf.self_closing && !leaf.attributes.is_empty() {
            for (name, value) in &leaf.attributes {
                fields.push(FlatField {
                    column: self.join(&[leaf.name.as_str(), name.as_str()]),
                    value,
                });
            }
            return Ok(());
        }

        let value = leaf.text.as_deref().unwrap_or("");

        let column = if siblings > 1 && leaf.name.eq_ignore_ascii_case(&self.config.named_variant_tag) {
            let name = self.required_attribute(leaf, parent, &self.config.name_attribute)?;
            let name = sanitize_value(name);
            self.join(&[parent.name.as_str(), name.as_ref()])
        } else if siblings == 1 && parent.name.eq_ignore_ascii_case(&self.config.positional_variant_tag) {
            let index = self.required_attribute(parent, owner, &self.config.index_attribute)?;
            let index = sanitize_value(index);
            self.join(&[
                parent.name.as_str(),
                self.config.index_attribute.as_str(),
                index.as_ref(),
                leaf.name.as_str(),
            ])
        } else {
            // repeated siblings without a marker share one column; the last one wins
            self.join(&[parent.name.as_str(), leaf.name.as_str()])
        };

        fields.push(FlatField { column, value });
        Ok(())
    }

    fn required_attribute<'a>(
        &self,
        node: &'a XmlNode,
        parent: &XmlNode,
        attribute: &str,
    ) -> Result<&'a str> {
        node.attribute(attribute).ok_or_else(|| ConvertError::Schema {
            element: node.name.clone(),
            parent: parent.name.clone(),
            attribute: attribute.to_string(),
            position: node.position,
        })
    }

    fn join(&self, parts: &[&str]) -> String {
        parts.join(self.config.separator.as_str())
    }
}
