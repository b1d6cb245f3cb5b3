//! Minimal SVG element tree.
//!
//! Sources arrive pre-optimized, so only elements, attributes and text are
//! kept. Comments, processing instructions and the XML declaration are
//! dropped.

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

/// A node below an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgNode {
    /// Nested element
    Element(SvgElement),
    /// Character data with entities resolved
    Text(String),
}

/// An SVG element with attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgElement {
    /// Qualified tag name, e.g. `path` or `svg`
    pub name: String,
    /// Attribute name/value pairs, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<SvgNode>,
}

impl SvgElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Returns the value of attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over element children, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|child| match child {
            SvgNode::Element(element) => Some(element),
            SvgNode::Text(_) => None,
        })
    }
}

/// Parses `markup` and returns the root `<svg>` element.
///
/// # Errors
///
/// Returns a message if the markup is not well-formed or its root element is
/// not `<svg>`.
pub fn parse(markup: &str) -> Result<SvgElement, String> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<SvgElement> = Vec::new();
    let mut root: Option<SvgElement> = None;

    loop {
        match reader.read_event().map_err(|e| {
            format!("{} at byte {}", e, reader.error_position())
        })? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err("content after the root element".to_string());
                }
                stack.push(SvgElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = SvgElement::from_start(&start)?;
                close(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                if end.name().as_ref() != element.name.as_bytes() {
                    return Err(format!(
                        "mismatched closing tag </{}> for <{}>",
                        String::from_utf8_lossy(end.name().as_ref()),
                        element.name
                    ));
                }
                close(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(SvgNode::Text(text.into_owned()));
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&cdata).into_owned();
                    parent.children.push(SvgNode::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed <{}> element", open.name));
    }

    let root = root.ok_or_else(|| "no root element".to_string())?;
    if root.name != "svg" {
        return Err(format!("root element is <{}>, expected <svg>", root.name));
    }

    Ok(root)
}

fn close(
    stack: &mut [SvgElement],
    root: &mut Option<SvgElement>,
    element: SvgElement,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(SvgNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err("content after the root element".to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_icon() {
        let root = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M12 2a10 10 0 1 0 0 20"/></svg>"#,
        )
        .unwrap();

        assert_eq!(root.name, "svg");
        assert_eq!(root.attribute("viewBox"), Some("0 0 24 24"));
        let children: Vec<_> = root.elements().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].attribute("d"), Some("M12 2a10 10 0 1 0 0 20"));
    }

    #[test]
    fn test_parse_skips_declaration_and_comments() {
        let root = parse(
            "<?xml version=\"1.0\"?>\n<!-- generated -->\n<svg><g><circle r=\"4\"/></g></svg>",
        )
        .unwrap();

        let group = root.elements().next().unwrap();
        assert_eq!(group.name, "g");
        assert_eq!(group.elements().next().unwrap().name, "circle");
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let root = parse(r#"<svg aria-label="a &amp; b"><title>Fish &amp; Chips</title></svg>"#).unwrap();

        assert_eq!(root.attribute("aria-label"), Some("a & b"));
        let title = root.elements().next().unwrap();
        assert_eq!(title.children, vec![SvgNode::Text("Fish & Chips".to_string())]);
    }

    #[test]
    fn test_parse_rejects_non_svg_root() {
        let err = parse("<html></html>").unwrap_err();
        assert!(err.contains("expected <svg>"));
    }

    #[test]
    fn test_parse_rejects_unclosed_element() {
        assert!(parse("<svg><path d=\"M0 0\">").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(parse("").is_err());
    }
}
