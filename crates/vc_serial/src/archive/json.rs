//! JSON archives, backed by `serde_json`.
//!
//! The root is always an object. Objects keep insertion order and every
//! member, repeated keys included, and sequences become arrays.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::{self, Vec};
use core::fmt;
use std::io::Write;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::{Number, Value};

use crate::SerialError;
use crate::archive::{InputArchive, NodeNames, OutputArchive, Scalar, ScalarKind};

// -----------------------------------------------------------------------------
// JsonOptions

/// Output settings of [`JsonOutputArchive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Emit newlines and indentation.
    pub pretty: bool,
    /// Spaces per nesting level, when `pretty`.
    pub indent: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 4,
        }
    }
}

impl JsonOptions {
    /// Single-line output.
    pub const fn compact() -> Self {
        Self {
            pretty: false,
            indent: 0,
        }
    }
}

// -----------------------------------------------------------------------------
// Node

/// An owned JSON tree whose objects are member lists.
///
/// A base field and an own field may share a name, so a key can repeat
/// inside one object. `serde_json::Map` would keep only the last entry.
#[derive(Debug)]
enum Node {
    Leaf(Value),
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
}

impl Node {
    fn describe(&self) -> &'static str {
        match self {
            Node::Leaf(value) => describe(value),
            Node::Array(_) => "array",
            Node::Object(_) => "object",
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(value) => value.serialize(serializer),
            Node::Array(items) => serializer.collect_seq(items),
            Node::Object(members) => {
                let mut state = serializer.serialize_map(Some(members.len()))?;
                for (key, value) in members {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any json value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Leaf(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Leaf(Value::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Leaf(Value::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Leaf(Value::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Leaf(Value::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Leaf(Value::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Leaf(Value::Null))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut members = Vec::with_capacity(map.size_hint().unwrap_or_default());
        while let Some(entry) = map.next_entry::<String, Node>()? {
            members.push(entry);
        }
        Ok(Node::Object(members))
    }
}

// -----------------------------------------------------------------------------
// JsonOutputArchive

enum OutFrame {
    Object {
        key: Option<String>,
        members: Vec<(String, Node)>,
        names: NodeNames,
    },
    Array {
        key: Option<String>,
        items: Vec<Node>,
    },
}

/// Writes a JSON document to `W`.
///
/// The document is assembled in memory and written by [`finish`](Self::finish).
pub struct JsonOutputArchive<W: Write> {
    writer: W,
    options: JsonOptions,
    stack: Vec<OutFrame>,
    pending: Option<String>,
}

impl<W: Write> JsonOutputArchive<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, JsonOptions::default())
    }

    pub fn with_options(writer: W, options: JsonOptions) -> Self {
        Self {
            writer,
            options,
            stack: alloc::vec![OutFrame::Object {
                key: None,
                members: Vec::new(),
                names: NodeNames::default(),
            }],
            pending: None,
        }
    }

    /// Writes the document and returns the writer.
    ///
    /// Fails with [`SerialError::Unbalanced`] if an object or sequence is still open.
    pub fn finish(mut self) -> Result<W, SerialError> {
        if self.stack.len() != 1 {
            return Err(SerialError::Unbalanced("json node left open at finish"));
        }
        let root = match self.stack.pop() {
            Some(OutFrame::Object { members, .. }) => Node::Object(members),
            _ => return Err(SerialError::Unbalanced("json root is not an object")),
        };

        if self.options.pretty {
            let indent = " ".repeat(self.options.indent);
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut self.writer, formatter);
            root.serialize(&mut serializer)?;
        } else {
            serde_json::to_writer(&mut self.writer, &root)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Resolves the key of the next value in the current node.
    fn next_key(&mut self) -> Option<String> {
        let pending = self.pending.take();
        match self.stack.last_mut() {
            Some(OutFrame::Object { names, .. }) => Some(names.resolve(pending)),
            _ => None,
        }
    }

    fn attach(&mut self, key: Option<String>, value: Node) -> Result<(), SerialError> {
        match self.stack.last_mut() {
            Some(OutFrame::Object { members, .. }) => {
                if let Some(key) = key {
                    members.push((key, value));
                }
                Ok(())
            }
            Some(OutFrame::Array { items, .. }) => {
                items.push(value);
                Ok(())
            }
            None => Err(SerialError::Unbalanced("json value written after root closed")),
        }
    }
}

fn float(value: f64) -> Result<Value, SerialError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or(SerialError::NonFiniteFloat(value))
}

impl<W: Write> OutputArchive for JsonOutputArchive<W> {
    fn set_next_name(&mut self, name: &str) {
        self.pending = Some(name.to_string());
    }

    fn write_scalar(&mut self, value: Scalar<'_>) -> Result<(), SerialError> {
        let value = match value {
            Scalar::Bool(v) => Value::Bool(v),
            Scalar::Char(v) => Value::String(v.to_string()),
            Scalar::I8(v) => Value::from(v),
            Scalar::I16(v) => Value::from(v),
            Scalar::I32(v) => Value::from(v),
            Scalar::I64(v) => Value::from(v),
            Scalar::U8(v) => Value::from(v),
            Scalar::U16(v) => Value::from(v),
            Scalar::U32(v) => Value::from(v),
            Scalar::U64(v) => Value::from(v),
            Scalar::F32(v) => float(f64::from(v))?,
            Scalar::F64(v) => float(v)?,
            Scalar::Str(v) => Value::String(v.into_owned()),
        };
        let key = self.next_key();
        self.attach(key, Node::Leaf(value))
    }

    fn begin_object(&mut self) -> Result<(), SerialError> {
        let key = self.next_key();
        self.stack.push(OutFrame::Object {
            key,
            members: Vec::new(),
            names: NodeNames::default(),
        });
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), SerialError> {
        if self.stack.len() < 2 {
            return Err(SerialError::Unbalanced("json end_object without begin_object"));
        }
        match self.stack.pop() {
            Some(OutFrame::Object { key, members, .. }) => self.attach(key, Node::Object(members)),
            _ => Err(SerialError::Unbalanced("json end_object closes a sequence")),
        }
    }

    fn begin_sequence(&mut self, len: usize) -> Result<(), SerialError> {
        let key = self.next_key();
        self.stack.push(OutFrame::Array {
            key,
            items: Vec::with_capacity(len),
        });
        Ok(())
    }

    fn end_sequence(&mut self) -> Result<(), SerialError> {
        match self.stack.pop() {
            Some(OutFrame::Array { key, items }) => self.attach(key, Node::Array(items)),
            Some(frame) => {
                self.stack.push(frame);
                Err(SerialError::Unbalanced("json end_sequence closes an object"))
            }
            None => Err(SerialError::Unbalanced("json end_sequence without begin_sequence")),
        }
    }
}

// -----------------------------------------------------------------------------
// JsonInputArchive

struct InFrame {
    values: vec::IntoIter<Node>,
}

/// Reads values back from a parsed JSON document, positionally.
///
/// Every object member is kept, so repeated keys are read in document order.
pub struct JsonInputArchive {
    stack: Vec<InFrame>,
}

impl JsonInputArchive {
    /// Parses `text`. The root must be an object.
    pub fn parse(text: &str) -> Result<Self, SerialError> {
        Self::from_root(serde_json::from_str(text)?)
    }

    /// Parses a document from `reader`. The root must be an object.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, SerialError> {
        Self::from_root(serde_json::from_reader(reader)?)
    }

    fn from_root(root: Node) -> Result<Self, SerialError> {
        match root {
            Node::Object(members) => Ok(Self {
                stack: alloc::vec![object_frame(members)],
            }),
            other => Err(SerialError::mismatch("json object at root", other.describe())),
        }
    }

    fn next_value(&mut self) -> Result<Node, SerialError> {
        self.stack
            .last_mut()
            .and_then(|frame| frame.values.next())
            .ok_or(SerialError::UnexpectedEnd("json node"))
    }

    fn pop_frame(&mut self) -> Result<(), SerialError> {
        if self.stack.len() < 2 {
            return Err(SerialError::Unbalanced("json node closed past the root"));
        }
        if let Some(frame) = self.stack.pop() {
            let left = frame.values.len();
            if left > 0 {
                log::warn!("json node closed with {left} unread values");
            }
        }
        Ok(())
    }
}

fn object_frame(members: Vec<(String, Node)>) -> InFrame {
    let values: Vec<Node> = members.into_iter().map(|(_, v)| v).collect();
    InFrame {
        values: values.into_iter(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn integer<T>(kind: ScalarKind, value: &Value) -> Result<T, SerialError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let Value::Number(number) = value else {
        return Err(SerialError::mismatch(kind.name(), describe(value)));
    };
    let converted = if let Some(v) = number.as_u64() {
        <T as TryFrom<u64>>::try_from(v).ok()
    } else if let Some(v) = number.as_i64() {
        <T as TryFrom<i64>>::try_from(v).ok()
    } else {
        None
    };
    converted.ok_or_else(|| SerialError::OutOfRange {
        kind,
        value: number.to_string(),
    })
}

impl InputArchive for JsonInputArchive {
    fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>, SerialError> {
        let value = match self.next_value()? {
            Node::Leaf(value) => value,
            other => return Err(SerialError::mismatch(kind.name(), other.describe())),
        };
        Ok(match kind {
            ScalarKind::Bool => match value {
                Value::Bool(v) => Scalar::Bool(v),
                other => return Err(SerialError::mismatch("bool", describe(&other))),
            },
            ScalarKind::Char => {
                let Value::String(text) = value else {
                    return Err(SerialError::mismatch("char", describe(&value)));
                };
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Scalar::Char(c),
                    _ => return Err(SerialError::mismatch("single character", text)),
                }
            }
            ScalarKind::I8 => Scalar::I8(integer(kind, &value)?),
            ScalarKind::I16 => Scalar::I16(integer(kind, &value)?),
            ScalarKind::I32 => Scalar::I32(integer(kind, &value)?),
            ScalarKind::I64 => Scalar::I64(integer(kind, &value)?),
            ScalarKind::U8 => Scalar::U8(integer(kind, &value)?),
            ScalarKind::U16 => Scalar::U16(integer(kind, &value)?),
            ScalarKind::U32 => Scalar::U32(integer(kind, &value)?),
            ScalarKind::U64 => Scalar::U64(integer(kind, &value)?),
            ScalarKind::F32 | ScalarKind::F64 => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| SerialError::mismatch(kind.name(), describe(&value)))?;
                if kind == ScalarKind::F32 {
                    Scalar::F32(v as f32)
                } else {
                    Scalar::F64(v)
                }
            }
            ScalarKind::Str => match value {
                Value::String(v) => Scalar::Str(Cow::Owned(v)),
                other => return Err(SerialError::mismatch("string", describe(&other))),
            },
        })
    }

    fn begin_object(&mut self) -> Result<(), SerialError> {
        match self.next_value()? {
            Node::Object(members) => {
                self.stack.push(object_frame(members));
                Ok(())
            }
            other => Err(SerialError::mismatch("object", other.describe())),
        }
    }

    fn end_object(&mut self) -> Result<(), SerialError> {
        self.pop_frame()
    }

    fn begin_sequence(&mut self) -> Result<usize, SerialError> {
        match self.next_value()? {
            Node::Array(items) => {
                let len = items.len();
                self.stack.push(InFrame {
                    values: items.into_iter(),
                });
                Ok(len)
            }
            other => Err(SerialError::mismatch("array", other.describe())),
        }
    }

    fn end_sequence(&mut self) -> Result<(), SerialError> {
        self.pop_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut dyn OutputArchive) -> Result<(), SerialError>) -> String {
        let mut archive = JsonOutputArchive::with_options(Vec::new(), JsonOptions::compact());
        f(&mut archive).unwrap();
        String::from_utf8(archive.finish().unwrap()).unwrap()
    }

    #[test]
    fn unnamed_values_get_placeholders() {
        let text = render(|ar| {
            ar.write_scalar(Scalar::U8(1))?;
            ar.set_next_name("named");
            ar.write_scalar(Scalar::Bool(true))?;
            ar.write_scalar(Scalar::Str("x".into()))
        });
        assert_eq!(text, r#"{"value0":1,"named":true,"value1":"x"}"#);
    }

    #[test]
    fn sequences_are_arrays() {
        let text = render(|ar| {
            ar.set_next_name("list");
            ar.begin_sequence(2)?;
            ar.write_scalar(Scalar::I32(-1))?;
            ar.write_scalar(Scalar::I32(2))?;
            ar.end_sequence()
        });
        assert_eq!(text, r#"{"list":[-1,2]}"#);
    }

    #[test]
    fn repeated_keys_are_kept() {
        let text = render(|ar| {
            ar.set_next_name("id");
            ar.write_scalar(Scalar::U32(1))?;
            ar.set_next_name("id");
            ar.write_scalar(Scalar::U32(2))
        });
        assert_eq!(text, r#"{"id":1,"id":2}"#);

        let mut archive = JsonInputArchive::parse(r#"{"id": 1, "id": "two"}"#).unwrap();
        assert_eq!(archive.read_scalar(ScalarKind::U32).unwrap(), Scalar::U32(1));
        assert_eq!(
            archive.read_scalar(ScalarKind::Str).unwrap(),
            Scalar::Str("two".into())
        );
    }

    #[test]
    fn pretty_output_is_indented() {
        let mut archive = JsonOutputArchive::new(Vec::new());
        archive.set_next_name("list");
        archive.begin_sequence(1).unwrap();
        archive.write_scalar(Scalar::Bool(false)).unwrap();
        archive.end_sequence().unwrap();
        let text = String::from_utf8(archive.finish().unwrap()).unwrap();
        assert_eq!(text, "{\n    \"list\": [\n        false\n    ]\n}");
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let mut archive = JsonOutputArchive::new(Vec::new());
        let err = archive.write_scalar(Scalar::F64(f64::NAN)).unwrap_err();
        assert!(matches!(err, SerialError::NonFiniteFloat(_)));
    }

    #[test]
    fn unbalanced_finish_fails() {
        let mut archive = JsonOutputArchive::new(Vec::new());
        archive.begin_object().unwrap();
        assert!(matches!(archive.finish(), Err(SerialError::Unbalanced(_))));
    }

    #[test]
    fn reads_are_positional() {
        let mut archive = JsonInputArchive::parse(r#"{"b": 7, "a": "text"}"#).unwrap();
        assert_eq!(archive.read_scalar(ScalarKind::U16).unwrap(), Scalar::U16(7));
        assert_eq!(
            archive.read_scalar(ScalarKind::Str).unwrap(),
            Scalar::Str("text".into())
        );
        assert!(matches!(
            archive.read_scalar(ScalarKind::Bool),
            Err(SerialError::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn integer_range_is_checked() {
        let mut archive = JsonInputArchive::parse(r#"{"v": 300, "w": -1}"#).unwrap();
        assert!(matches!(
            archive.read_scalar(ScalarKind::U8),
            Err(SerialError::OutOfRange { kind: ScalarKind::U8, .. })
        ));
        assert!(matches!(
            archive.read_scalar(ScalarKind::U32),
            Err(SerialError::OutOfRange { .. })
        ));
    }

    #[test]
    fn root_must_be_object() {
        assert!(matches!(
            JsonInputArchive::parse("[1, 2]"),
            Err(SerialError::Mismatch { .. })
        ));
        assert!(matches!(
            JsonInputArchive::parse("{\"a\": "),
            Err(SerialError::Json(_))
        ));
    }
}
