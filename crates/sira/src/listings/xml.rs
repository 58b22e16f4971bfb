//! Conversion of provider XML into a JSON tree.
//!
//! Elements with children become objects, text-only elements become strings
//! and repeated sibling elements become arrays. Attributes are ignored. A lone
//! `<immobilie>` therefore arrives as an object rather than a one-element
//! array, which [`listings_from_document`] normalizes.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::domain::Listing;

const ROOT_ELEMENT: &str = "justimmo";
const LISTING_ELEMENT: &str = "immobilie";
const TEXT_KEY: &str = "#text";

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("unexpected closing tag </{0}>")]
    UnbalancedClose(String),
    #[error("document ended inside <{0}>")]
    Unclosed(String),
    #[error("unexpected shape for <{element}>: {detail}")]
    Shape { element: String, detail: String },
}

struct OpenElement {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl OpenElement {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            Value::String(self.text)
        } else {
            let mut children = self.children;
            if !self.text.is_empty() {
                children.insert(TEXT_KEY.to_string(), Value::String(self.text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

fn attach(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Parses a document into `{ root_name: tree }`.
pub fn parse_document(xml: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root = Map::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(OpenElement::new(element_name(start.name().as_ref())));
            }
            Event::Empty(empty) => {
                let name = element_name(empty.name().as_ref());
                let target = match stack.last_mut() {
                    Some(parent) => &mut parent.children,
                    None => &mut root,
                };
                attach(target, name, Value::String(String::new()));
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(end) => {
                let closing = element_name(end.name().as_ref());
                let element = match stack.pop() {
                    Some(element) if element.name == closing => element,
                    _ => return Err(XmlError::UnbalancedClose(closing)),
                };
                let (name, value) = element.into_value();
                let target = match stack.last_mut() {
                    Some(parent) => &mut parent.children,
                    None => &mut root,
                };
                attach(target, name, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }

    Ok(Value::Object(root))
}

/// Extracts the listings of one provider response.
///
/// A missing or empty `<immobilie>` yields no listings; a single one yields a
/// one-element collection. Any other shape is an error.
pub fn listings_from_document(xml: &str) -> Result<Vec<Listing>, XmlError> {
    let mut document = parse_document(xml)?;
    let listing_element = document
        .get_mut(ROOT_ELEMENT)
        .and_then(|root| root.get_mut(LISTING_ELEMENT))
        .map(Value::take);

    let entries = match listing_element {
        None => return Ok(Vec::new()),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(single @ Value::Object(_)) => vec![single],
        Some(other) => {
            return Err(XmlError::Shape {
                element: LISTING_ELEMENT.to_string(),
                detail: format!("expected element content, found {other}"),
            })
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|err| XmlError::Shape {
                element: format!("{LISTING_ELEMENT}[{index}]"),
                detail: err.to_string(),
            })
        })
        .collect()
}
