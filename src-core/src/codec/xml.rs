//! XML side of the codec.
//!
//! Documents look like
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <ArrayOfTodoItem>
//!   <TodoItem><Id>1</Id><Description>...</Description>...</TodoItem>
//! </ArrayOfTodoItem>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::value::{Error as DeError, MapDeserializer};
use serde::de::{DeserializeOwned, Error as _, IntoDeserializer, Visitor};
use serde::{forward_to_deserialize_any, Deserializer, Serialize};

use super::CodecError;
use crate::domain::TodoItem;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// A type that travels as one child element of a list document
pub trait XmlListElement: Serialize + DeserializeOwned {
    /// Tag of each item
    const ELEMENT: &'static str;
    /// Tag of the enclosing list
    const LIST_ROOT: &'static str;
}

impl XmlListElement for TodoItem {
    const ELEMENT: &'static str = "TodoItem";
    const LIST_ROOT: &'static str = "ArrayOfTodoItem";
}

/// Serialize `items` as an XML list document
pub fn encode_xml<T: XmlListElement>(items: &[T]) -> Result<Vec<u8>, CodecError> {
    let mut out = String::from(XML_DECLARATION);
    if items.is_empty() {
        out.push_str(&format!("<{} />", T::LIST_ROOT));
        return Ok(out.into_bytes());
    }

    out.push_str(&format!("<{}>", T::LIST_ROOT));
    for item in items {
        let element = quick_xml::se::to_string_with_root(T::ELEMENT, item)
            .map_err(|e| CodecError::Xml(e.to_string()))?;
        out.push_str(&element);
    }
    out.push_str(&format!("</{}>", T::LIST_ROOT));
    Ok(out.into_bytes())
}

/// Parse an XML list document into items.
///
/// The root must be `T::LIST_ROOT`; children with other tags are skipped.
pub fn decode_xml<T: XmlListElement>(text: &str) -> Result<Vec<T>, CodecError> {
    let result = decode_items::<T>(text);
    if let Err(e) = &result {
        log::warn!("XML import rejected: {}", e);
    }
    result
}

fn decode_items<T: XmlListElement>(text: &str) -> Result<Vec<T>, CodecError> {
    let mut reader = Reader::from_str(text);
    let mut items = Vec::new();
    let mut inside_root = false;
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) if !inside_root => {
                expect_root::<T>(start.name().as_ref(), seen_root)?;
                inside_root = true;
                seen_root = true;
            }
            Event::Empty(start) if !inside_root => {
                // <ArrayOfTodoItem/>: a list with nothing in it
                expect_root::<T>(start.name().as_ref(), seen_root)?;
                seen_root = true;
            }
            Event::Start(start) => {
                if start.name().as_ref() == T::ELEMENT.as_bytes() {
                    let fields = read_fields(&mut reader)?;
                    items.push(build_element::<T>(fields)?);
                } else {
                    reader.read_to_end(start.name()).map_err(xml_error)?;
                }
            }
            Event::Empty(start) => {
                if start.name().as_ref() == T::ELEMENT.as_bytes() {
                    items.push(build_element::<T>(Vec::new())?);
                }
            }
            Event::End(_) => inside_root = false,
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(CodecError::Xml("document has no root element".to_string()));
    }
    Ok(items)
}

fn xml_error(e: quick_xml::Error) -> CodecError {
    CodecError::Xml(e.to_string())
}

fn expect_root<T: XmlListElement>(name: &[u8], seen_root: bool) -> Result<(), CodecError> {
    if seen_root {
        return Err(CodecError::Xml("document has more than one root element".to_string()));
    }
    if name != T::LIST_ROOT.as_bytes() {
        return Err(CodecError::Xml(format!(
            "expected <{}> root, found <{}>",
            T::LIST_ROOT,
            String::from_utf8_lossy(name)
        )));
    }
    Ok(())
}

/// Child elements of one item as (tag, text) pairs. Stops after the
/// item's end tag.
fn read_fields(reader: &mut Reader<&[u8]>) -> Result<Vec<(String, FieldText)>, CodecError> {
    let mut fields = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(field) => {
                let name = String::from_utf8_lossy(field.name().as_ref()).into_owned();
                let text = read_field_text(reader, &name)?;
                fields.push((name, FieldText(text)));
            }
            Event::Empty(field) => {
                let name = String::from_utf8_lossy(field.name().as_ref()).into_owned();
                fields.push((name, FieldText(String::new())));
            }
            Event::End(_) => return Ok(fields),
            Event::Eof => return Err(CodecError::Xml("unexpected end of document".to_string())),
            _ => {}
        }
    }
}

/// Text of a leaf element exactly as written, entities resolved and
/// whitespace kept.
fn read_field_text(reader: &mut Reader<&[u8]>, name: &str) -> Result<String, CodecError> {
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Text(content) => text.push_str(&content.unescape().map_err(xml_error)?),
            Event::CData(content) => {
                let raw = std::str::from_utf8(&content)
                    .map_err(|e| CodecError::Xml(format!("<{}>: {}", name, e)))?;
                text.push_str(raw);
            }
            Event::End(_) => return Ok(text),
            Event::Start(_) | Event::Empty(_) => {
                return Err(CodecError::Xml(format!("unexpected markup inside <{}>", name)))
            }
            Event::Eof => return Err(CodecError::Xml("unexpected end of document".to_string())),
            _ => {}
        }
    }
}

fn build_element<T: DeserializeOwned>(fields: Vec<(String, FieldText)>) -> Result<T, CodecError> {
    let map = MapDeserializer::<_, DeError>::new(fields.into_iter());
    T::deserialize(map).map_err(|e| CodecError::Xml(e.to_string()))
}

/// Text content of one field, parsed on demand into the type serde asks for
struct FieldText(String);

impl<'de> IntoDeserializer<'de, DeError> for FieldText {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
            let value = self
                .0
                .trim()
                .parse::<$ty>()
                .map_err(|_| DeError::custom(format!("invalid number '{}'", self.0)))?;
            visitor.$visit(value)
        }
    )*};
}

impl<'de> Deserializer<'de> for FieldText {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        visitor.visit_string(self.0)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let raw = self.0.trim();
        if raw == "1" || raw.eq_ignore_ascii_case("true") {
            visitor.visit_bool(true)
        } else if raw == "0" || raw.eq_ignore_ascii_case("false") {
            visitor.visit_bool(false)
        } else {
            Err(DeError::custom(format!("invalid boolean '{}'", self.0)))
        }
    }

    deserialize_number! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        if self.0.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        i128 u128 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

/// True when `text` is a well-formed document: one root element, matching
/// tags, valid attributes and entities, no text outside the root.
pub fn is_valid_xml(text: &str) -> bool {
    let mut reader = Reader::from_str(text);
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut roots = 0;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(_) => return false,
        };
        match event {
            Event::Start(start) => {
                if open.is_empty() {
                    roots += 1;
                }
                if roots > 1 || start.attributes().any(|a| a.is_err()) {
                    return false;
                }
                open.push(start.name().as_ref().to_vec());
            }
            Event::Empty(start) => {
                if open.is_empty() {
                    roots += 1;
                }
                if roots > 1 || start.attributes().any(|a| a.is_err()) {
                    return false;
                }
            }
            Event::End(end) => match open.pop() {
                Some(name) if name.as_slice() == end.name().as_ref() => {}
                _ => return false,
            },
            Event::Text(content) => {
                if open.is_empty() && !content.iter().all(u8::is_ascii_whitespace) {
                    return false;
                }
                if content.unescape().is_err() {
                    return false;
                }
            }
            Event::CData(_) if open.is_empty() => return false,
            Event::Eof => break,
            _ => {}
        }
    }

    roots == 1 && open.is_empty()
}
