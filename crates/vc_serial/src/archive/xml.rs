//! XML archives.
//!
//! Output is written as text; input is parsed with `roxmltree`. Every value is
//! an element named after its field, scalars are element text, and the
//! document root is `<serial>`.

use alloc::string::{String, ToString};
use alloc::vec::{self, Vec};
use core::fmt::Write as _;
use std::io::{Read, Write};

use crate::SerialError;
use crate::archive::{InputArchive, NodeNames, OutputArchive, Scalar, ScalarKind};

const ROOT: &str = "serial";

// -----------------------------------------------------------------------------
// XmlOptions

/// Output settings of [`XmlOutputArchive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions {
    /// Put every element on its own line, indented with tabs.
    pub indent: bool,
    /// Mark sequence elements with `size="dynamic"`.
    pub size_attributes: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            indent: true,
            size_attributes: true,
        }
    }
}

// -----------------------------------------------------------------------------
// XmlOutputArchive

struct OutFrame {
    name: String,
    names: NodeNames,
    has_children: bool,
}

/// Writes an XML document to `W`.
///
/// The document is assembled in memory and written by [`finish`](Self::finish).
pub struct XmlOutputArchive<W: Write> {
    writer: W,
    options: XmlOptions,
    buffer: String,
    stack: Vec<OutFrame>,
    pending: Option<String>,
}

impl<W: Write> XmlOutputArchive<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlOptions::default())
    }

    pub fn with_options(writer: W, options: XmlOptions) -> Self {
        let mut buffer = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        if options.indent {
            buffer.push('\n');
        }
        buffer.push('<');
        buffer.push_str(ROOT);
        buffer.push('>');

        Self {
            writer,
            options,
            buffer,
            stack: alloc::vec![OutFrame {
                name: ROOT.to_string(),
                names: NodeNames::default(),
                has_children: false,
            }],
            pending: None,
        }
    }

    /// Closes the root element, writes the document and returns the writer.
    pub fn finish(mut self) -> Result<W, SerialError> {
        if self.stack.len() != 1 {
            return Err(SerialError::Unbalanced("xml element left open at finish"));
        }
        self.close_element()?;
        if self.options.indent {
            self.buffer.push('\n');
        }
        self.writer.write_all(self.buffer.as_bytes())?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn newline(&mut self, depth: usize) {
        if self.options.indent {
            self.buffer.push('\n');
            for _ in 0..depth {
                self.buffer.push('\t');
            }
        }
    }

    /// Writes the opening tag of the next child of the current element.
    fn open_element(&mut self, sequence: bool) -> Result<String, SerialError> {
        let pending = self.pending.take();
        let depth = self.stack.len();
        let frame = self
            .stack
            .last_mut()
            .ok_or(SerialError::Unbalanced("xml element written after root closed"))?;
        let name = frame.names.resolve(pending);
        frame.has_children = true;

        if !is_xml_name(&name) {
            return Err(SerialError::InvalidName(name));
        }

        self.newline(depth);
        self.buffer.push('<');
        self.buffer.push_str(&name);
        if sequence && self.options.size_attributes {
            self.buffer.push_str(r#" size="dynamic""#);
        }
        self.buffer.push('>');
        Ok(name)
    }

    fn close_element(&mut self) -> Result<(), SerialError> {
        let frame = self
            .stack
            .pop()
            .ok_or(SerialError::Unbalanced("xml element closed twice"))?;
        if frame.has_children {
            let depth = self.stack.len();
            self.newline(depth);
        }
        self.buffer.push_str("</");
        self.buffer.push_str(&frame.name);
        self.buffer.push('>');
        Ok(())
    }

    fn push_frame(&mut self, name: String) {
        self.stack.push(OutFrame {
            name,
            names: NodeNames::default(),
            has_children: false,
        });
    }

    fn pop_frame(&mut self) -> Result<(), SerialError> {
        if self.stack.len() < 2 {
            return Err(SerialError::Unbalanced("xml node closed past the root"));
        }
        self.close_element()
    }
}

impl<W: Write> OutputArchive for XmlOutputArchive<W> {
    fn set_next_name(&mut self, name: &str) {
        self.pending = Some(name.to_string());
    }

    fn write_scalar(&mut self, value: Scalar<'_>) -> Result<(), SerialError> {
        let name = self.open_element(false)?;
        match &value {
            Scalar::Str(text) => escape_into(&mut self.buffer, text)?,
            Scalar::Char(c) => escape_into(&mut self.buffer, c.encode_utf8(&mut [0; 4]))?,
            other => {
                // Numbers and booleans never need escaping.
                let _ = write!(self.buffer, "{other}");
            }
        }
        self.buffer.push_str("</");
        self.buffer.push_str(&name);
        self.buffer.push('>');
        Ok(())
    }

    fn begin_object(&mut self) -> Result<(), SerialError> {
        let name = self.open_element(false)?;
        self.push_frame(name);
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), SerialError> {
        self.pop_frame()
    }

    fn begin_sequence(&mut self, _len: usize) -> Result<(), SerialError> {
        let name = self.open_element(true)?;
        self.push_frame(name);
        Ok(())
    }

    fn end_sequence(&mut self) -> Result<(), SerialError> {
        self.pop_frame()
    }
}

/// Whether `name` can be used as an element name.
///
/// ASCII subset of the XML `Name` production, without namespaces.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start = |c: char| c.is_ascii_alphabetic() || c == '_';
    start(first)
        && chars.all(|c| start(c) || c.is_ascii_digit() || c == '-' || c == '.')
        && !name.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("xml"))
}

/// Whether `c` matches the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Appends `text` as element content.
///
/// `\r` is written as a character reference, since parsers fold a raw one
/// into `\n`.
fn escape_into(buffer: &mut String, text: &str) -> Result<(), SerialError> {
    for c in text.chars() {
        match c {
            '&' => buffer.push_str("&amp;"),
            '<' => buffer.push_str("&lt;"),
            '>' => buffer.push_str("&gt;"),
            '"' => buffer.push_str("&quot;"),
            '\'' => buffer.push_str("&apos;"),
            '\r' => buffer.push_str("&#13;"),
            c if is_xml_char(c) => buffer.push(c),
            c => return Err(SerialError::UnrepresentableChar(c)),
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// XmlInputArchive

/// An element of the parsed document, detached from the source text.
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let text = node
            .children()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect::<String>();
        Self {
            name: node.tag_name().name().to_string(),
            text,
            children: node
                .children()
                .filter(|n| n.is_element())
                .map(Element::from_node)
                .collect(),
        }
    }
}

/// Reads values back from a parsed XML document, positionally.
pub struct XmlInputArchive {
    stack: Vec<vec::IntoIter<Element>>,
}

impl XmlInputArchive {
    /// Parses `text`. The root element must be `<serial>`.
    pub fn parse(text: &str) -> Result<Self, SerialError> {
        let document = roxmltree::Document::parse(text)?;
        let root = Element::from_node(document.root_element());
        if root.name != ROOT {
            return Err(SerialError::mismatch("<serial> root element", root.name));
        }
        Ok(Self {
            stack: alloc::vec![root.children.into_iter()],
        })
    }

    /// Reads the whole of `reader` and parses it.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, SerialError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse(&String::from_utf8(bytes)?)
    }

    fn next_element(&mut self) -> Result<Element, SerialError> {
        self.stack
            .last_mut()
            .and_then(Iterator::next)
            .ok_or(SerialError::UnexpectedEnd("xml element"))
    }

    fn pop_frame(&mut self) -> Result<(), SerialError> {
        if self.stack.len() < 2 {
            return Err(SerialError::Unbalanced("xml node closed past the root"));
        }
        if let Some(rest) = self.stack.pop() {
            let left = rest.len();
            if left > 0 {
                log::warn!("xml element closed with {left} unread children");
            }
        }
        Ok(())
    }
}

fn parse_number<T: core::str::FromStr>(kind: ScalarKind, text: &str) -> Result<T, SerialError> {
    let text = text.trim();
    text.parse().map_err(|_| {
        if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
            SerialError::OutOfRange {
                kind,
                value: text.to_string(),
            }
        } else {
            SerialError::mismatch(kind.name(), text)
        }
    })
}

fn parse_scalar(kind: ScalarKind, text: String) -> Result<Scalar<'static>, SerialError> {
    Ok(match kind {
        ScalarKind::Bool => match text.trim() {
            "true" | "1" => Scalar::Bool(true),
            "false" | "0" => Scalar::Bool(false),
            _ => return Err(SerialError::mismatch("bool", text)),
        },
        ScalarKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Scalar::Char(c),
                _ => return Err(SerialError::mismatch("single character", text)),
            }
        }
        ScalarKind::I8 => Scalar::I8(parse_number(kind, &text)?),
        ScalarKind::I16 => Scalar::I16(parse_number(kind, &text)?),
        ScalarKind::I32 => Scalar::I32(parse_number(kind, &text)?),
        ScalarKind::I64 => Scalar::I64(parse_number(kind, &text)?),
        ScalarKind::U8 => Scalar::U8(parse_number(kind, &text)?),
        ScalarKind::U16 => Scalar::U16(parse_number(kind, &text)?),
        ScalarKind::U32 => Scalar::U32(parse_number(kind, &text)?),
        ScalarKind::U64 => Scalar::U64(parse_number(kind, &text)?),
        ScalarKind::F32 => Scalar::F32(parse_number(kind, &text)?),
        ScalarKind::F64 => Scalar::F64(parse_number(kind, &text)?),
        ScalarKind::Str => Scalar::Str(text.into()),
    })
}

impl InputArchive for XmlInputArchive {
    fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>, SerialError> {
        let element = self.next_element()?;
        if !element.children.is_empty() {
            return Err(SerialError::mismatch(kind.name(), alloc::format!("<{}> with children", element.name)));
        }
        parse_scalar(kind, element.text)
    }

    fn begin_object(&mut self) -> Result<(), SerialError> {
        let element = self.next_element()?;
        self.stack.push(element.children.into_iter());
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), SerialError> {
        self.pop_frame()
    }

    fn begin_sequence(&mut self) -> Result<usize, SerialError> {
        let element = self.next_element()?;
        let len = element.children.len();
        self.stack.push(element.children.into_iter());
        Ok(len)
    }

    fn end_sequence(&mut self) -> Result<(), SerialError> {
        self.pop_frame()
    }
}
