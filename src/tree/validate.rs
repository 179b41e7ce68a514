use crate::error::{ConvertError, Result, UnexpectedElement};
use crate::tree::node::XmlNode;
use tracing::debug;

/// Pick the records out of the parsed top-level elements.
///
/// A document with a single non-record top-level element is a wrapper
/// (`<Events><Event/>...</Events>`) and its children are the records.
/// Anything else is a bare sequence whose top-level elements are the records.
pub fn select_records(mut roots: Vec<XmlNode>, record_tags: &[String]) -> Vec<XmlNode> {
    if roots.len() == 1 && !is_record_tag(&roots[0].name, record_tags) {
        let wrapper = roots.remove(0);
        debug!("treating <{}> as the wrapping root element", wrapper.name);
        return wrapper.children;
    }
    roots
}

/// Check that every record's tag is one of `record_tags` (ASCII
/// case-insensitive), reporting all offenders at once
pub fn validate_records(records: &[XmlNode], record_tags: &[String]) -> Result<()> {
    let offenders: Vec<UnexpectedElement> = records
        .iter()
        .filter(|record| !is_record_tag(&record.name, record_tags))
        .map(|record| UnexpectedElement {
            tag: record.name.clone(),
            position: record.position,
        })
        .collect();

    if offenders.is_empty() {
        return Ok(());
    }

    Err(ConvertError::Validation {
        expected: record_tags.join(", "),
        offenders,
    })
}

fn is_record_tag(name: &str, record_tags: &[String]) -> bool {
    record_tags.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parser::parse_document;
    use crate::tree::Position;

    fn event_tags() -> Vec<String> {
        vec!["Event".to_string()]
    }

    #[test]
    fn test_wrapper_children_become_records() {
        let roots = parse_document("<Events><Event/><event/></Events>").unwrap();
        let records = select_records(roots, &event_tags());

        assert_eq!(records.len(), 2);
        assert!(validate_records(&records, &event_tags()).is_ok());
    }

    #[test]
    fn test_single_bare_record_is_kept() {
        let roots = parse_document("<Event><System/></Event>").unwrap();
        let records = select_records(roots, &event_tags());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Event");
    }

    #[test]
    fn test_reports_every_offender_with_position() {
        let input = "<Events>\n  <Event/>\n  <Foo/>\n  <Event/>\n    <Bar/>\n</Events>";
        let records = select_records(parse_document(input).unwrap(), &event_tags());

        let err = validate_records(&records, &event_tags()).unwrap_err();
        match err {
            ConvertError::Validation { expected, offenders } => {
                assert_eq!(expected, "Event");
                assert_eq!(
                    offenders,
                    vec![
                        UnexpectedElement {
                            tag: "Foo".to_string(),
                            position: Position::new(3, 3),
                        },
                        UnexpectedElement {
                            tag: "Bar".to_string(),
                            position: Position::new(5, 5),
                        },
                    ]
                );
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_forest_is_valid() {
        let records = select_records(parse_document("<Events/>").unwrap(), &event_tags());
        assert!(records.is_empty());
        assert!(validate_records(&records, &event_tags()).is_ok());
    }
}
