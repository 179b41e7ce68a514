//! # Flatlog - Event Log Flattening Toolkit
//!
//! Converts a log of hierarchical XML records (one element per event) into a
//! single flat table with a stable superset of columns.
//!
//! ## Modules
//!
//! - **tree**: Parse markup into an element forest and check the record layer
//! - **flatten**: Discover columns, flatten records into rows, render rows
//!
//! ## Quick Start
//!
//! ```rust
//! use flatlog::{convert_str, FlattenConfig, WriterConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = r#"<Events>
//!   <Event><System><Level>4</Level></System></Event>
//!   <Event><EventData><Data Name="User">alice</Data><Data Name="Host">web1</Data></EventData></Event>
//! </Events>"#;
//!
//! let table = convert_str(input, &FlattenConfig::default())?;
//! assert_eq!(
//!     table.columns.columns(),
//!     &["System_Level", "EventData_User", "EventData_Host"]
//! );
//!
//! let csv = table.render(&WriterConfig::default());
//! assert_eq!(
//!     csv,
//!     "System_Level;EventData_User;EventData_Host\n\"4\";\"\";\"\"\n\"\";\"alice\";\"web1\"\n"
//! );
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info};

pub mod error;
pub mod flatten;
pub mod tree;

// Re-export commonly used types for convenience
pub use error::{ConvertError, Result, UnexpectedElement};
pub use flatten::{ColumnSchema, FlattenConfig, FlattenRule, Row, RowFlattener, RowWriter, WriterConfig};
pub use tree::{Position, XmlNode};

/// The flattened form of a whole input: its columns and one row per record
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub columns: ColumnSchema,
    pub rows: Vec<Row>,
}

impl Table {
    /// Write the header and every row
    pub fn write_to<W: Write>(&self, writer: &mut RowWriter<W>) -> Result<()> {
        writer.write_header(&self.columns)?;
        writer.write_rows(&self.rows, &self.columns)
    }

    /// Render the table as it would be written to a file
    pub fn render(&self, config: &WriterConfig) -> String {
        let mut out = String::new();
        if config.byte_order_mark {
            out.push('\u{feff}');
        }
        out.push_str(&flatten::render_header(&self.columns, config));
        out.push_str(&config.line_ending);
        for row in &self.rows {
            out.push_str(&flatten::render_row(row, &self.columns, config));
            out.push_str(&config.line_ending);
        }
        out
    }
}

/// Counts reported after a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub columns: usize,
    pub rows: usize,
}

/// Parse `input` and return its validated records
pub fn load_records(input: &str, config: &FlattenConfig, cancel: &AtomicBool) -> Result<Vec<XmlNode>> {
    let roots = tree::parse_document_with_cancel(input, cancel)?;
    let records = tree::select_records(roots, &config.record_tags);
    tree::validate_records(&records, &config.record_tags)?;
    debug!("validated {} record(s)", records.len());
    Ok(records)
}

/// Discover the column list of `input` without building rows
pub fn discover_columns(input: &str, config: &FlattenConfig) -> Result<ColumnSchema> {
    let records = load_records(input, config, &AtomicBool::new(false))?;
    ColumnSchema::discover(&records, config)
}

/// Parse, validate, discover and flatten `input` in memory
pub fn convert_str(input: &str, config: &FlattenConfig) -> Result<Table> {
    convert_str_with_cancel(input, config, &AtomicBool::new(false))
}

/// Like [`convert_str`], giving up while parsing once `cancel` is raised
pub fn convert_str_with_cancel(input: &str, config: &FlattenConfig, cancel: &AtomicBool) -> Result<Table> {
    let records = load_records(input, config, cancel)?;
    let columns = ColumnSchema::discover(&records, config)?;
    let rows = RowFlattener::new(config.clone()).flatten_all(&records)?;
    Ok(Table { columns, rows })
}

/// Main entry point: convert the file at `input_path` into a new file at
/// `output_path`.
///
/// The output is only created once every row has been computed, and never
/// replaces an existing file.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    flatten_config: &FlattenConfig,
    writer_config: &WriterConfig,
) -> Result<ConversionSummary> {
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();
    info!(input = %input_path.display(), output = %output_path.display(), "processing files");

    let input = std::fs::read_to_string(input_path).map_err(|source| ConvertError::Io {
        path: input_path.to_path_buf(),
        source,
    })?;

    let table = convert_str(&input, flatten_config)?;
    info!(
        "collected data columns: {}, rows: {}",
        table.columns.len(),
        table.rows.len()
    );

    let mut writer = RowWriter::create_new(output_path, writer_config.clone())?;
    table.write_to(&mut writer)?;
    writer.flush()?;

    info!("finished");
    Ok(ConversionSummary {
        columns: table.columns.len(),
        rows: table.rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_conversion() {
        let input = r#"<Events>
            <Event><System><Level>4</Level></System></Event>
            <Event><System><Task>1</Task></System></Event>
        </Events>"#;

        let table = convert_str(input, &FlattenConfig::default()).unwrap();

        assert_eq!(table.columns.columns(), &["System_Level", "System_Task"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("System_Level"), Some("4"));
        assert_eq!(table.rows[1].get("System_Level"), None);
    }

    #[test]
    fn test_render_matches_writer() {
        let input = "<Events><Event><A><b>1</b></A></Event></Events>";
        let table = convert_str(input, &FlattenConfig::default()).unwrap();
        let config = WriterConfig::default();

        let mut writer = RowWriter::new(Vec::new(), config.clone(), "<memory>");
        table.write_to(&mut writer).unwrap();
        let written = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(written, table.render(&config));
        assert_eq!(written, "A_b\n\"1\"\n");
    }

    #[test]
    fn test_validation_runs_before_flattening() {
        // the <Other> record would also fail flattening, but validation reports first
        let input = "<Events><Other><D><Data>1</Data><Data>2</Data></D></Other></Events>";

        let err = convert_str(input, &FlattenConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Validation { .. }));
    }

    #[test]
    fn test_custom_record_tags() {
        let config = FlattenConfig {
            record_tags: vec!["row".to_string(), "entry".to_string()],
            ..FlattenConfig::default()
        };
        let input = "<log><ROW><a><b>1</b></a></ROW><Entry><a><c>2</c></a></Entry></log>";

        let table = convert_str(input, &config).unwrap();
        assert_eq!(table.columns.columns(), &["a_b", "a_c"]);
    }

    #[test]
    fn test_header_stays_on_one_line() {
        let input = r#"<Events><Event><EventData><Data Name="a&#10;b">1</Data><Data Name="c">2</Data></EventData></Event></Events>"#;
        let table = convert_str(input, &FlattenConfig::default()).unwrap();

        let rendered = table.render(&WriterConfig::default());
        assert_eq!(rendered, "EventData_a b;EventData_c\n\"1\";\"2\"\n");
        assert_eq!(rendered.lines().count(), 1 + table.rows.len());
    }

    #[test]
    fn test_cancelled_conversion() {
        let cancel = AtomicBool::new(true);
        let err = convert_str_with_cancel("<Events><Event/></Events>", &FlattenConfig::default(), &cancel).unwrap_err();
        assert!(matches!(err, ConvertError::Cancelled));
    }

    #[test]
    fn test_discover_columns_only() {
        let input = r#"<Event><System><Provider Name="p"/></System></Event>"#;
        let columns = discover_columns(input, &FlattenConfig::default()).unwrap();
        assert_eq!(columns.columns(), &["Provider_Name"]);
    }
}
