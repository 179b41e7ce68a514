use crate::error::{ConvertError, Result};
use crate::flatten::plan::ColumnSchema;
use crate::flatten::types::Row;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Output layout for the rendered table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Separator between header names; rows are joined by `"` + this + `"`
    pub field_separator: char,

    /// Terminator written after every line
    pub line_ending: String,

    /// Start the file with a UTF-8 byte order mark
    pub byte_order_mark: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            field_separator: ';',
            line_ending: String::from("\n"),
            byte_order_mark: false,
        }
    }
}

impl WriterConfig {
    fn row_delimiter(&self) -> String {
        format!("\"{}\"", self.field_separator)
    }
}

/// The header line: column names joined by the field separator
pub fn render_header(schema: &ColumnSchema, config: &WriterConfig) -> String {
    let mut buf = [0; 4];
    let separator: &str = config.field_separator.encode_utf8(&mut buf);
    schema.columns().join(separator)
}

/// One row line: the whole line is quoted once and values are joined by
/// `";"`, so `a`, `` and `b` render as `"a";"";"b"`
pub fn render_row(row: &Row, schema: &ColumnSchema, config: &WriterConfig) -> String {
    let values: Vec<&str> = row.values_in(schema.columns()).collect();
    format!("\"{}\"", values.join(config.row_delimiter().as_str()))
}

/// Writes a header and rows to any output
pub struct RowWriter<W: Write> {
    writer: W,
    config: WriterConfig,
    path: PathBuf,
}

impl RowWriter<BufWriter<File>> {
    /// Create the output file, refusing to touch one that already exists
    pub fn create_new<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                ErrorKind::AlreadyExists => ConvertError::OutputExists { path: path.clone() },
                _ => io_error(&path, source),
            })?;

        Ok(RowWriter {
            writer: BufWriter::new(file),
            config,
            path,
        })
    }
}

impl<W: Write> RowWriter<W> {
    /// Wrap an arbitrary writer; `label` names it in I/O errors
    pub fn new(writer: W, config: WriterConfig, label: impl Into<PathBuf>) -> Self {
        RowWriter {
            writer,
            config,
            path: label.into(),
        }
    }

    /// Write the optional byte order mark and the header line
    pub fn write_header(&mut self, schema: &ColumnSchema) -> Result<()> {
        let mut line = render_header(schema, &self.config);
        if self.config.byte_order_mark {
            line.insert(0, '\u{feff}');
        }
        self.write_line(&line)
    }

    pub fn write_row(&mut self, row: &Row, schema: &ColumnSchema) -> Result<()> {
        let line = render_row(row, schema, &self.config);
        self.write_line(&line)
    }

    pub fn write_rows(&mut self, rows: &[Row], schema: &ColumnSchema) -> Result<()> {
        for row in rows {
            self.write_row(row, schema)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        let path = &self.path;
        self.writer.flush().map_err(|source| io_error(path, source))
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let RowWriter { writer, config, path } = self;
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(config.line_ending.as_bytes()))
            .map_err(|source| io_error(path, source))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ConvertError {
    ConvertError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(columns: &[&str]) -> ColumnSchema {
        let mut schema = ColumnSchema::new();
        for column in columns {
            schema.push(column.to_string());
        }
        schema
    }

    #[test]
    fn test_render_header() {
        let schema = schema(&["System_Level", "EventData_A"]);
        assert_eq!(
            render_header(&schema, &WriterConfig::default()),
            "System_Level;EventData_A"
        );
    }

    #[test]
    fn test_render_row_quotes_line_once() {
        let schema = schema(&["a", "b", "c"]);
        let mut row = Row::new();
        row.insert("a".to_string(), "1".to_string());
        row.insert("c".to_string(), "3".to_string());

        assert_eq!(
            render_row(&row, &schema, &WriterConfig::default()),
            r#""1";"";"3""#
        );
    }

    #[test]
    fn test_render_empty_row() {
        let schema = schema(&["a"]);
        assert_eq!(render_row(&Row::new(), &schema, &WriterConfig::default()), r#""""#);
    }

    #[test]
    fn test_writer_output() {
        let schema = schema(&["x", "y"]);
        let mut row = Row::new();
        row.insert("y".to_string(), "v".to_string());

        let config = WriterConfig {
            field_separator: ',',
            ..WriterConfig::default()
        };
        let mut writer = RowWriter::new(Vec::new(), config, "<memory>");
        writer.write_header(&schema).unwrap();
        writer.write_rows(&[row], &schema).unwrap();

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(output, "x,y\n\"\",\"v\"\n");
    }

    #[test]
    fn test_byte_order_mark() {
        let config = WriterConfig {
            byte_order_mark: true,
            ..WriterConfig::default()
        };
        let mut writer = RowWriter::new(Vec::new(), config, "<memory>");
        writer.write_header(&schema(&["a"])).unwrap();

        let output = writer.into_inner().unwrap();
        assert_eq!(output, b"\xEF\xBB\xBFa\n");
    }

    #[test]
    fn test_create_new_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "keep me").unwrap();

        let err = RowWriter::create_new(&path, WriterConfig::default()).err().unwrap();
        assert!(matches!(err, ConvertError::OutputExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
