//! One-shot save/load entry points.
//!
//! Each function opens one archive, performs exactly one save or load, and
//! finalises the archive before returning. On error nothing partial is
//! returned; a load target may be left partially written.

use alloc::string::String;
use alloc::vec::Vec;
use std::io::{Read, Write};

use crate::SerialError;
use crate::archive::{BinaryInputArchive, BinaryOutputArchive, InputArchive, Load, OutputArchive, Save};
use crate::archive::{JsonInputArchive, JsonOptions, JsonOutputArchive};
use crate::archive::{PortableBinaryInputArchive, PortableBinaryOptions, PortableBinaryOutputArchive};
use crate::archive::{XmlInputArchive, XmlOptions, XmlOutputArchive};

// -----------------------------------------------------------------------------
// Generic

/// Saves `value` into an already open archive.
#[inline]
pub fn to_output_archive<T: Save + ?Sized>(
    archive: &mut dyn OutputArchive,
    value: &T,
) -> Result<(), SerialError> {
    archive.write(value)
}

/// Loads `value` from an already open archive.
#[inline]
pub fn from_input_archive<T: Load + ?Sized>(
    archive: &mut dyn InputArchive,
    value: &mut T,
) -> Result<(), SerialError> {
    archive.read(value)
}

// -----------------------------------------------------------------------------
// JSON

/// Saves `value` as pretty-printed JSON.
///
/// A value without an explicit [`named`](crate::named) wrapper is written
/// under `value0`.
pub fn to_json<T: Save + ?Sized>(value: &T) -> Result<String, SerialError> {
    to_json_with(value, JsonOptions::default())
}

/// Saves `value` as JSON with the given options.
pub fn to_json_with<T: Save + ?Sized>(value: &T, options: JsonOptions) -> Result<String, SerialError> {
    let mut archive = JsonOutputArchive::with_options(Vec::new(), options);
    to_output_archive(&mut archive, value)?;
    let bytes = archive.finish()?;
    Ok(String::from_utf8(bytes)?)
}

/// Saves `value` as pretty-printed JSON into `writer`.
pub fn to_json_writer<W: Write, T: Save + ?Sized>(writer: W, value: &T) -> Result<W, SerialError> {
    let mut archive = JsonOutputArchive::new(writer);
    to_output_archive(&mut archive, value)?;
    archive.finish()
}

/// Loads `value` from JSON text. Members are consumed positionally.
///
/// # Examples
///
/// ```
/// use vc_serial::derive::Serial;
///
/// #[derive(Serial, Default)]
/// struct Config {
///     message: String,
/// }
///
/// let mut config = Config::default();
/// vc_serial::from_json(&mut config, r#"{"config":{"message":"JelloWorld!"}}"#).unwrap();
/// assert_eq!(config.message, "JelloWorld!");
/// ```
pub fn from_json<T: Load + ?Sized>(value: &mut T, text: &str) -> Result<(), SerialError> {
    let mut archive = JsonInputArchive::parse(text)?;
    from_input_archive(&mut archive, value)
}

/// Loads `value` from JSON read out of `reader`.
pub fn from_json_reader<R: Read, T: Load + ?Sized>(value: &mut T, reader: R) -> Result<(), SerialError> {
    let mut archive = JsonInputArchive::from_reader(reader)?;
    from_input_archive(&mut archive, value)
}

/// Loads a new `T` from JSON text.
pub fn decode_json<T: Load + Default>(text: &str) -> Result<T, SerialError> {
    let mut value = T::default();
    from_json(&mut value, text)?;
    Ok(value)
}

// -----------------------------------------------------------------------------
// XML

/// Saves `value` as an indented XML document rooted at `<serial>`.
pub fn to_xml<T: Save + ?Sized>(value: &T) -> Result<String, SerialError> {
    to_xml_with(value, XmlOptions::default())
}

/// Saves `value` as XML with the given options.
pub fn to_xml_with<T: Save + ?Sized>(value: &T, options: XmlOptions) -> Result<String, SerialError> {
    let mut archive = XmlOutputArchive::with_options(Vec::new(), options);
    to_output_archive(&mut archive, value)?;
    let bytes = archive.finish()?;
    Ok(String::from_utf8(bytes)?)
}

/// Saves `value` as XML into `writer`.
pub fn to_xml_writer<W: Write, T: Save + ?Sized>(writer: W, value: &T) -> Result<W, SerialError> {
    let mut archive = XmlOutputArchive::new(writer);
    to_output_archive(&mut archive, value)?;
    archive.finish()
}

/// Loads `value` from an XML document. Elements are consumed positionally.
pub fn from_xml<T: Load + ?Sized>(value: &mut T, text: &str) -> Result<(), SerialError> {
    let mut archive = XmlInputArchive::parse(text)?;
    from_input_archive(&mut archive, value)
}

/// Loads `value` from XML read out of `reader`.
pub fn from_xml_reader<R: Read, T: Load + ?Sized>(value: &mut T, reader: R) -> Result<(), SerialError> {
    let mut archive = XmlInputArchive::from_reader(reader)?;
    from_input_archive(&mut archive, value)
}

/// Loads a new `T` from an XML document.
pub fn decode_xml<T: Load + Default>(text: &str) -> Result<T, SerialError> {
    let mut value = T::default();
    from_xml(&mut value, text)?;
    Ok(value)
}

// -----------------------------------------------------------------------------
// Binary

/// Saves `value` in the native-endian binary layout.
pub fn to_binary<T: Save + ?Sized>(value: &T) -> Result<Vec<u8>, SerialError> {
    let mut bytes = Vec::new();
    {
        let mut archive = BinaryOutputArchive::new(&mut bytes);
        to_output_archive(&mut archive, value)?;
        archive.finish()?;
    }
    Ok(bytes)
}

/// Loads `value` from bytes written by [`to_binary`] on a machine of the same byte order.
pub fn from_binary<T: Load + ?Sized>(value: &mut T, bytes: &[u8]) -> Result<(), SerialError> {
    let mut archive = BinaryInputArchive::new(bytes);
    from_input_archive(&mut archive, value)
}

/// Loads a new `T` from bytes written by [`to_binary`].
pub fn decode_binary<T: Load + Default>(bytes: &[u8]) -> Result<T, SerialError> {
    let mut value = T::default();
    from_binary(&mut value, bytes)?;
    Ok(value)
}

/// Saves `value` in the portable binary layout, in native byte order.
pub fn to_portable_binary<T: Save + ?Sized>(value: &T) -> Result<Vec<u8>, SerialError> {
    to_portable_binary_with(value, PortableBinaryOptions::default())
}

/// Saves `value` in the portable binary layout with the given options.
pub fn to_portable_binary_with<T: Save + ?Sized>(
    value: &T,
    options: PortableBinaryOptions,
) -> Result<Vec<u8>, SerialError> {
    let mut bytes = Vec::new();
    {
        let mut archive = PortableBinaryOutputArchive::with_options(&mut bytes, options)?;
        to_output_archive(&mut archive, value)?;
        archive.finish()?;
    }
    Ok(bytes)
}

/// Loads `value` from bytes written by [`to_portable_binary`], whatever their byte order.
pub fn from_portable_binary<T: Load + ?Sized>(value: &mut T, bytes: &[u8]) -> Result<(), SerialError> {
    let mut archive = PortableBinaryInputArchive::new(bytes)?;
    from_input_archive(&mut archive, value)
}

/// Loads a new `T` from bytes written by [`to_portable_binary`].
pub fn decode_portable_binary<T: Load + Default>(bytes: &[u8]) -> Result<T, SerialError> {
    let mut value = T::default();
    from_portable_binary(&mut value, bytes)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashMap;

    use crate::archive::{Endian, PortableBinaryOptions};
    use crate::derive::Serial;
    use crate::{SerialError, named};

    use super::*;

    #[derive(Serial, Default, Debug, PartialEq, Clone)]
    struct Point {
        x: f64,
        y: f64,
    }

    #[derive(Serial, Default, Debug, PartialEq, Clone)]
    struct Shape {
        name: String,
        points: Vec<Point>,
        tags: BTreeMap<String, u32>,
        hidden: Option<bool>,
        tint: Option<[u8; 3]>,
        origin: Box<Point>,
        counter: usize,
        letter: char,
    }

    fn sample() -> Shape {
        Shape {
            name: String::from("triangle <&>"),
            points: vec![
                Point { x: 0.0, y: 0.0 },
                Point { x: 1.5, y: -2.25 },
                Point { x: 3.0, y: 1e10 },
            ],
            tags: BTreeMap::from([(String::from("sides"), 3), (String::from("z"), 0)]),
            hidden: None,
            tint: Some([255, 0, 128]),
            origin: Box::new(Point { x: -1.0, y: 0.5 }),
            counter: 42,
            letter: 'λ',
        }
    }

    #[test]
    fn json_round_trip() {
        let shape = sample();
        let text = to_json(&shape).unwrap();
        assert_eq!(decode_json::<Shape>(&text).unwrap(), shape);
    }

    #[test]
    fn xml_round_trip() {
        let shape = sample();
        let text = to_xml(&shape).unwrap();
        assert!(text.contains("<name>triangle &lt;&amp;&gt;</name>"));
        assert_eq!(decode_xml::<Shape>(&text).unwrap(), shape);
    }

    #[test]
    fn binary_round_trip() {
        let shape = sample();
        let bytes = to_binary(&shape).unwrap();
        assert_eq!(decode_binary::<Shape>(&bytes).unwrap(), shape);
    }

    #[test]
    fn portable_binary_round_trip_in_both_orders() {
        let shape = sample();
        for endian in [Endian::Little, Endian::Big] {
            let bytes = to_portable_binary_with(&shape, PortableBinaryOptions { endian }).unwrap();
            assert_eq!(bytes[0], u8::from(endian == Endian::Little));
            assert_eq!(decode_portable_binary::<Shape>(&bytes).unwrap(), shape);
        }
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Greeting {
        message: String,
    }

    #[test]
    fn named_top_level_value() {
        let greeting = Greeting {
            message: String::from("Hello, World!"),
        };
        let text = to_json_with(&named("hello", &greeting), JsonOptions::compact()).unwrap();
        assert_eq!(text, r#"{"hello":{"message":"Hello, World!"}}"#);

        let pretty = to_json(&named("hello", &greeting)).unwrap();
        assert_eq!(
            pretty,
            "{\n    \"hello\": {\n        \"message\": \"Hello, World!\"\n    }\n}"
        );

        let unnamed = to_json_with(&greeting, JsonOptions::compact()).unwrap();
        assert_eq!(unnamed, r#"{"value0":{"message":"Hello, World!"}}"#);

        let xml = to_xml(&named("hello", &greeting)).unwrap();
        assert!(xml.contains("<hello>\n\t\t<message>Hello, World!</message>\n\t</hello>"));
    }

    #[test]
    fn hand_written_json_loads_by_position() {
        let mut greeting = Greeting::default();
        from_json(&mut greeting, r#"{"config":{"message":"JelloWorld!"}}"#).unwrap();
        assert_eq!(greeting.message, "JelloWorld!");
    }

    #[derive(Serial, Default, Debug)]
    struct Wibble {
        label: Rc<String>,
        shared: Arc<String>,
    }

    #[test]
    fn shared_string_fields() {
        let wibble = Wibble {
            label: Rc::new(String::from("wobble")),
            shared: Arc::new(String::from("wubble")),
        };
        let text = to_json(&wibble).unwrap();
        let copy: Wibble = decode_json(&text).unwrap();
        assert_eq!(*copy.label, "wobble");
        assert_eq!(*copy.shared, "wubble");
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Parent {
        foo: String,
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Child {
        #[serial(base)]
        parent: Parent,
        bar: String,
    }

    #[test]
    fn inherited_fields_round_trip() {
        let child = Child {
            parent: Parent { foo: String::from("foo") },
            bar: String::from("bar"),
        };
        let text = to_json_with(&child, JsonOptions::compact()).unwrap();
        assert_eq!(text, r#"{"value0":{"foo":"foo","bar":"bar"}}"#);
        assert_eq!(decode_json::<Child>(&text).unwrap(), child);

        let xml = to_xml(&child).unwrap();
        assert_eq!(decode_xml::<Child>(&xml).unwrap(), child);
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Entity {
        id: u32,
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Item {
        #[serial(base)]
        entity: Entity,
        id: u32,
        name: String,
    }

    #[test]
    fn base_and_own_field_may_share_a_name() {
        let item = Item {
            entity: Entity { id: 1 },
            id: 2,
            name: String::from("n"),
        };

        let text = to_json_with(&item, JsonOptions::compact()).unwrap();
        assert_eq!(text, r#"{"value0":{"id":1,"id":2,"name":"n"}}"#);
        assert_eq!(decode_json::<Item>(&text).unwrap(), item);
        assert_eq!(decode_json::<Item>(&to_json(&item).unwrap()).unwrap(), item);

        assert_eq!(decode_xml::<Item>(&to_xml(&item).unwrap()).unwrap(), item);
        assert_eq!(decode_binary::<Item>(&to_binary(&item).unwrap()).unwrap(), item);
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Note {
        text: String,
    }

    #[test]
    fn xml_keeps_carriage_returns() {
        let note = Note {
            text: String::from("line1\r\nline2\rend"),
        };
        assert_eq!(decode_xml::<Note>(&to_xml(&note).unwrap()).unwrap(), note);

        let control = Note {
            text: String::from("a\u{1}b"),
        };
        assert!(matches!(to_xml(&control), Err(SerialError::UnrepresentableChar('\u{1}'))));
        assert_eq!(decode_json::<Note>(&to_json(&control).unwrap()).unwrap(), control);
    }

    mod private {
        #[derive(crate::derive::Serial, Default, Debug, PartialEq)]
        pub struct Secretive {
            hidden: u32,
            pub(super) visible: u32,
        }

        impl Secretive {
            pub fn new(hidden: u32, visible: u32) -> Self {
                Self { hidden, visible }
            }
        }
    }

    #[test]
    fn private_fields_round_trip() {
        let value = private::Secretive::new(7, 9);
        let bytes = to_binary(&value).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(decode_binary::<private::Secretive>(&bytes).unwrap(), value);
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Tagged(u8, #[serial(skip)] u8, String);

    #[test]
    fn tuple_fields_use_positional_names() {
        let text = to_json_with(&Tagged(1, 2, String::from("t")), JsonOptions::compact()).unwrap();
        assert_eq!(text, r#"{"value0":{"value0":1,"value2":"t"}}"#);

        let mut value = Tagged(0, 5, String::new());
        from_json(&mut value, &text).unwrap();
        assert_eq!(value, Tagged(1, 5, String::from("t")));
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Wrapper<T> {
        #[serial(rename = "payload")]
        inner: T,
        extra: HashMap<u8, Vec<T>>,
    }

    #[test]
    fn generic_types_round_trip() {
        let value = Wrapper {
            inner: 5_i16,
            extra: HashMap::from([(1, vec![-1, 2])]),
        };
        let text = to_json_with(&value, JsonOptions::compact()).unwrap();
        assert!(text.starts_with(r#"{"value0":{"payload":5,"extra":"#));
        assert_eq!(decode_json::<Wrapper<i16>>(&text).unwrap(), value);

        let other = Wrapper::<String>::default();
        assert_eq!(decode_binary::<Wrapper<String>>(&to_binary(&other).unwrap()).unwrap(), other);
    }

    #[test]
    fn writer_and_reader_variants() {
        let point = Point { x: 1.0, y: 2.0 };
        let bytes = to_json_writer(Vec::new(), &point).unwrap();
        let mut copy = Point::default();
        from_json_reader(&mut copy, bytes.as_slice()).unwrap();
        assert_eq!(copy, point);

        let bytes = to_xml_writer(Vec::new(), &point).unwrap();
        let mut copy = Point::default();
        from_xml_reader(&mut copy, bytes.as_slice()).unwrap();
        assert_eq!(copy, point);
    }

    #[test]
    fn backend_errors_propagate() {
        let bytes = to_binary(&sample()).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(decode_binary::<Shape>(truncated).is_err());

        assert!(matches!(
            decode_json::<Point>(r#"{"value0": {"x": 1.0,"#),
            Err(SerialError::Json(_))
        ));
        assert!(matches!(
            decode_xml::<Point>("<serial><value0><x>1</x></serial>"),
            Err(SerialError::Xml(_))
        ));
        assert!(matches!(
            decode_json::<Point>(r#"{"value0": {"x": 1.0}}"#),
            Err(SerialError::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn non_finite_json_is_refused() {
        let point = Point { x: f64::INFINITY, y: 0.0 };
        assert!(matches!(to_json(&point), Err(SerialError::NonFiniteFloat(_))));
        // Text and binary formats carry it.
        assert!(decode_xml::<Point>(&to_xml(&point).unwrap()).unwrap().x.is_infinite());
        assert_eq!(decode_binary::<Point>(&to_binary(&point).unwrap()).unwrap(), point);
    }
}
