/*!
 * TTML document model.
 *
 * Parses XML text into a tree of [`Element`]s with every tag and attribute name
 * reduced to its local name. Text is stored the way subtitle rendering needs it:
 * each element keeps its own leading text, and the text that follows an element
 * up to its next sibling is kept as that element's `tail`.
 */

use std::collections::HashMap;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::errors::ConversionError;

/// One XML element after namespace stripping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Local tag name (`p`, `span`, `div`, ...)
    pub name: String,

    /// Attributes keyed by local name
    pub attributes: HashMap<String, String>,

    /// Text between the start tag and the first child
    pub text: String,

    /// Text between the end tag and the next sibling
    pub tail: String,

    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty element with the given tag name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the value of an attribute by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns the first direct child with the given tag name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterates over direct children with the given tag name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Number of elements in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Element::subtree_len).sum::<usize>()
    }

    // Appends text to the slot that currently receives character data:
    // the tail of the last child if there is one, the element's own text otherwise
    fn push_text(&mut self, text: &str) {
        match self.children.last_mut() {
            Some(last) => last.tail.push_str(text),
            None => self.text.push_str(text),
        }
    }
}

/// A parsed TTML document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element (`tt`)
    pub root: Element,

    /// Ticks per second declared on the root, used by `t` time expressions
    pub tick_rate: Option<u32>,
}

impl Document {
    /// Parse a TTML document from XML text
    pub fn parse(xml: &str) -> Result<Self, ConversionError> {
        let root = parse_element_tree(xml)?;

        let tick_rate = match root.attribute("tickRate") {
            Some(value) => Some(parse_tick_rate(value)?),
            None => None,
        };

        debug!(
            "Parsed TTML document: root <{}>, {} elements, tickRate {:?}",
            root.name,
            root.subtree_len(),
            tick_rate
        );

        Ok(Self { root, tick_rate })
    }

    /// The `<body>` element that holds all timed content
    pub fn body(&self) -> Result<&Element, ConversionError> {
        self.root.child("body").ok_or(ConversionError::MissingBody)
    }

    /// All `<style>` definitions under `<head><styling>`
    pub fn style_definitions(&self) -> impl Iterator<Item = &Element> {
        self.root
            .children_named("head")
            .flat_map(|head| head.children_named("styling"))
            .flat_map(|styling| styling.children_named("style"))
    }
}

fn parse_tick_rate(value: &str) -> Result<u32, ConversionError> {
    match value.trim().parse::<u32>() {
        Ok(rate) if rate > 0 => Ok(rate),
        _ => Err(ConversionError::InvalidTickRate(value.to_string())),
    }
}

fn parse_element_tree(xml: &str) -> Result<Element, ConversionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    // Open elements, innermost last
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element = start_element(&reader, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = start_element(&reader, &start)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ConversionError::Xml("unexpected closing tag".to_string()))?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no subtitle content
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ConversionError::Xml(format!(
            "unexpected end of document inside <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }

    root.ok_or_else(|| ConversionError::Xml("document has no root element".to_string()))
}

fn start_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element, ConversionError> {
    let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));

    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(reader.decoder())?.into_owned();
        element.attributes.insert(name, value);
    }

    Ok(element)
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ConversionError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ConversionError::Xml("multiple root elements".to_string())),
    }
}
