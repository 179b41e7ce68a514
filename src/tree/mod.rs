//! Element forest: parsing markup into nodes and checking the record layer

pub mod node;
pub mod parser;
pub mod validate;

pub use node::{Position, XmlNode};
pub use parser::{parse_document, parse_document_with_cancel};
pub use validate::{select_records, validate_records};
