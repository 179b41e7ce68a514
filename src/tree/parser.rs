//! Builds the in-memory element forest from markup text
//!
//! The whole input is read through a quick-xml pull reader and folded into
//! [`XmlNode`] trees with a stack of open elements, the same way a DOM
//! loader would. Each element remembers where its start tag sits in the
//! source so later stages can point at it in diagnostics.

use crate::error::{ConvertError, Result};
use crate::tree::node::{LineIndex, Position, XmlNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Parse every top-level element of `input`
pub fn parse_document(input: &str) -> Result<Vec<XmlNode>> {
    parse_document_with_cancel(input, &AtomicBool::new(false))
}

/// Parse every top-level element of `input`, giving up with
/// [`ConvertError::Cancelled`] as soon as `cancel` is raised
pub fn parse_document_with_cancel(input: &str, cancel: &AtomicBool) -> Result<Vec<XmlNode>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let index = LineIndex::new(input);
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut roots: Vec<XmlNode> = Vec::new();

    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(ConvertError::Cancelled);
        }

        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                let at = index.position(input, reader.error_position() as usize);
                return Err(parse_error(e, at));
            }
        };

        // start tags cannot contain a literal '<', so the last one before the
        // reader's position is where the current event began
        let end = (reader.buffer_position() as usize).min(input.len());
        let offset = input[..end].rfind('<').unwrap_or(end);
        let position = index.position(input, offset);

        match event {
            Event::Start(start) => {
                stack.push(open_element(&start, position)?);
            }
            Event::Empty(start) => {
                let mut node = open_element(&start, position)?;
                node.self_closing = true;
                attach(node, &mut stack, &mut roots);
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| ConvertError::Parse {
                    message: "closing tag without a matching opening tag".to_string(),
                    position,
                })?;
                attach(node, &mut stack, &mut roots);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| parse_error(e, position))?;
                if text.trim().is_empty() {
                    continue;
                }
                match stack.last_mut() {
                    Some(node) => node.push_text(&text),
                    None => {
                        return Err(ConvertError::Parse {
                            message: "text outside of any element".to_string(),
                            position,
                        })
                    }
                }
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let text = std::str::from_utf8(&raw).map_err(|e| parse_error(e, position))?;
                if let Some(node) = stack.last_mut() {
                    if !text.trim().is_empty() {
                        node.push_text(text);
                    }
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConvertError::Parse {
            message: format!("element <{}> is never closed", open.name),
            position: open.position,
        });
    }

    if roots.is_empty() {
        return Err(ConvertError::Parse {
            message: "no element found".to_string(),
            position: index.position(input, input.len()),
        });
    }

    debug!("parsed {} top-level element(s)", roots.len());
    Ok(roots)
}

fn open_element(start: &BytesStart<'_>, position: Position) -> Result<XmlNode> {
    let name = utf8(start.local_name().as_ref(), position)?;
    let mut node = XmlNode::new(name, position);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(e, position))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = utf8(attr.key.local_name().as_ref(), position)?;
        let value = attr.unescape_value().map_err(|e| parse_error(e, position))?;
        node.attributes.push((key, value.into_owned()));
    }

    Ok(node)
}

fn attach(node: XmlNode, stack: &mut [XmlNode], roots: &mut Vec<XmlNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn utf8(bytes: &[u8], position: Position) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| parse_error(e, position))
}

fn parse_error(e: impl std::fmt::Display, position: Position) -> ConvertError {
    ConvertError::Parse {
        message: e.to_string(),
        position,
    }
}
