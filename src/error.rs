use crate::tree::Position;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

/// A top-level element whose tag is not one of the configured record tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedElement {
    pub tag: String,
    pub position: Position,
}

impl fmt::Display for UnexpectedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> at {}", self.tag, self.position)
    }
}

/// Everything that can abort a conversion run
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed input at {position}: {message}")]
    Parse { message: String, position: Position },

    #[error(
        "{} top-level element(s) are not records (expected one of: {expected}): {}",
        .offenders.len(),
        list_offenders(.offenders)
    )]
    Validation {
        expected: String,
        offenders: Vec<UnexpectedElement>,
    },

    #[error("<{element}> in <{parent}> at {position} has no '{attribute}' attribute to name its column")]
    Schema {
        element: String,
        parent: String,
        attribute: String,
        position: Position,
    },

    #[error("output file already exists: {}", .path.display())]
    OutputExists { path: PathBuf },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing was cancelled")]
    Cancelled,
}

fn list_offenders(offenders: &[UnexpectedElement]) -> String {
    offenders
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
