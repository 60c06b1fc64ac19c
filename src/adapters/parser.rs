use crate::core::BodyParser;
use crate::domain::model::ResponseFormat;
use crate::utils::error::{Result, RmaError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Decodes response bodies into a JSON value.
///
/// XML responses have the shape
/// `<Response success="true" ...><collection><record>..</record>..</collection></Response>`.
/// They are mapped onto the JSON envelope: root attributes become envelope
/// fields and the records of the collection element become the `msg` array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl BodyParser for ResponseParser {
    fn parse(&self, body: &[u8], format: ResponseFormat) -> Result<Value> {
        match format {
            ResponseFormat::Json => Ok(serde_json::from_slice(body)?),
            ResponseFormat::Xml => parse_xml_envelope(body),
        }
    }
}

#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    fn from_start(e: &BytesStart) -> Result<Self> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            attributes.push((key, value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
            attributes,
            ..Default::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn is_collection(&self) -> bool {
        !self.children.is_empty() || self.attribute("type") == Some("array")
    }

    /// Payload of an explicit `<msg>`: its records, or its text when the service sent a message.
    fn into_payload(self) -> Value {
        if self.is_collection() {
            Value::Array(self.children.into_iter().map(XmlElement::into_value).collect())
        } else {
            Value::String(self.text)
        }
    }

    /// Rails-style typing: `nil="true"`, `type="integer|float|decimal|boolean|array"`.
    fn into_value(self) -> Value {
        if self.attribute("nil") == Some("true") {
            return Value::Null;
        }

        let ty = self.attribute("type").map(str::to_string);

        if ty.as_deref() == Some("array") {
            return Value::Array(self.children.into_iter().map(XmlElement::into_value).collect());
        }

        if self.children.is_empty() {
            let text = self.text;
            return match ty.as_deref() {
                Some("integer") => text
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or(Value::String(text)),
                Some("float") | Some("decimal") => text
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::String(text)),
                Some("boolean") if text == "true" => Value::Bool(true),
                Some("boolean") if text == "false" => Value::Bool(false),
                _ => Value::String(text),
            };
        }

        let mut object = Map::new();
        for child in self.children {
            let name = child.name.clone();
            let value = child.into_value();
            match object.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(name, value);
                }
            }
        }
        Value::Object(object)
    }
}

fn parse_xml_tree(body: &[u8]) -> Result<XmlElement> {
    let mut reader = Reader::from_reader(body);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(XmlElement::from_start(&e)?),
            Event::Empty(e) => {
                let element = XmlElement::from_start(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    root.ok_or_else(|| RmaError::Processing {
        message: "XML response has no root element".to_string(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn parse_xml_envelope(body: &[u8]) -> Result<Value> {
    let root = parse_xml_tree(body)?;

    let mut envelope = Map::new();
    for (key, value) in &root.attributes {
        envelope.insert(key.clone(), Value::String(value.clone()));
    }

    // an explicit <msg> element wins over the collection convention
    let mut children = root.children;
    if let Some(pos) = children.iter().position(|c| c.name == "msg") {
        let msg = children.remove(pos);
        envelope.insert("msg".to_string(), msg.into_payload());
    } else if children.len() == 1 && children[0].is_collection() {
        let collection = children.remove(0);
        let records = collection
            .children
            .into_iter()
            .map(XmlElement::into_value)
            .collect();
        envelope.insert("msg".to_string(), Value::Array(records));
    } else if !children.is_empty() {
        tracing::warn!(
            "XML response has no payload collection among {} top-level elements",
            children.len()
        );
    }

    Ok(Value::Object(envelope))
}
