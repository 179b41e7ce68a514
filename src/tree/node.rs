use serde::Serialize;
use std::fmt;

/// 1-based line/column of an element's opening `<` in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// One element of the parsed forest.
///
/// Attributes and children keep their source order, which is the canonical
/// traversal order for column discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    /// Local tag name (namespace prefix stripped)
    pub name: String,

    /// Attributes as (local name, unescaped value) pairs
    pub attributes: Vec<(String, String)>,

    /// Concatenated text content, `None` when the element has no
    /// non-whitespace text
    pub text: Option<String>,

    pub children: Vec<XmlNode>,

    /// Written as `<tag/>` rather than `<tag></tag>`
    pub self_closing: bool,

    pub position: Position,
}

impl XmlNode {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        XmlNode {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            self_closing: false,
            position,
        }
    }

    /// A leaf has no child elements
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up an attribute by exact local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Maps byte offsets in the source text to line/column positions
pub(crate) struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        // CRLF, CR and LF each end a line
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        for (i, &b) in bytes.iter().enumerate() {
            let ends_line = b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n'));
            if ends_line {
                line_starts.push(i + 1);
            }
        }
        LineIndex { line_starts }
    }

    pub(crate) fn position(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = text
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - start);
        Position::new(line + 1, column + 1)
    }
}
