//! Minimal element tree built from quick-xml events
//!
//! Efetch responses hold a single article, so the whole document is read
//! into memory and navigated by child name. An element's `text` is its
//! direct text: character data before the first child element, unescaped,
//! whitespace preserved. Text after a child (tail text) is dropped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ExtractError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// First direct child with this name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct text, `None` when the element has no leading character data
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn push_text(&mut self, s: &str) {
        // Only text before the first child belongs to this element
        if self.children.is_empty() {
            self.text.get_or_insert_with(String::new).push_str(s);
        }
    }
}

/// Parse a complete document and return its root element.
pub fn parse_document(xml: &str) -> Result<Element, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let element = open_element(&e)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ExtractError::malformed("unexpected closing tag"))?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ExtractError::malformed(format!(
            "document ended inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| ExtractError::malformed("document has no root element"))
}

fn open_element(e: &BytesStart<'_>) -> Result<Element, ExtractError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        attributes,
        text: None,
        children: Vec::new(),
    })
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), ExtractError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ExtractError::malformed("multiple root elements")),
    }
    Ok(())
}
