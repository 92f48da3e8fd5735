//! Minimal element tree built from `quick-xml` events.
//!
//! SDF keeps its values in element text rather than attributes, so the
//! parser works on a small owned tree instead of streaming events.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::parser::{ParseError, ParseResult};

/// An XML element with its attributes, children and concatenated text.
#[derive(Clone, Debug, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text content, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text of the first child with the given tag, if that child exists.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Element::text)
    }

    /// First element with the given tag in document order, starting with `self`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Parse an XML document and return its root element.
pub fn parse_document(xml: &str) -> ParseResult<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                stack.push(start_element(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = start_element(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Xml("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(|err| ParseError::Xml(err.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Xml(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| ParseError::Xml("document has no root element".into()))
}

/// Convert a start tag into an empty element.
fn start_element(e: &BytesStart) -> ParseResult<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError::Xml(err.to_string()))?
            .to_string();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        ..Default::default()
    })
}

/// Append a finished element to its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> ParseResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ParseError::Xml("multiple root elements".into())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let doc = parse_document(
            r#"<sdf version="1.7">
                <model name="plant">
                    <link name="stem"><pose>1 2 3 0 0 0</pose></link>
                    <link/>
                </model>
            </sdf>"#,
        )
        .unwrap();

        assert_eq!(doc.name, "sdf");
        assert_eq!(doc.attr("version"), Some("1.7"));

        let model = doc.child("model").unwrap();
        assert_eq!(model.children_named("link").count(), 2);

        let stem = model.child("link").unwrap();
        assert_eq!(stem.attr("name"), Some("stem"));
        assert_eq!(stem.child_text("pose"), Some("1 2 3 0 0 0"));
    }

    #[test]
    fn test_text_is_unescaped() {
        let doc = parse_document("<uri>a&amp;b</uri>").unwrap();
        assert_eq!(doc.text(), "a&b");
    }

    #[test]
    fn test_find_depth_first() {
        let doc = parse_document("<sdf><world><model name='a'/></world><model name='b'/></sdf>").unwrap();
        assert_eq!(doc.find("model").and_then(|m| m.attr("name")), Some("a"));
    }

    #[test]
    fn test_child_text_absent() {
        let doc = parse_document("<link><pose/></link>").unwrap();
        assert_eq!(doc.child_text("pose"), Some(""));
        assert_eq!(doc.child_text("inertial"), None);
    }

    #[test]
    fn test_mismatched_tags() {
        assert!(matches!(parse_document("<a><b></a>"), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_unclosed_element() {
        assert!(matches!(parse_document("<a><b></b>"), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(parse_document(""), Err(ParseError::Xml(_))));
    }
}
