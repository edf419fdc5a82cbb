//! Automatic, metadata-driven serialization.
//!
//! `#[derive(Serial)]` extracts an ordered description of a type's fields and
//! bases at build time. That description is cached once per type
//! ([`info::TypeMetadata`]) and drives a generic save/load traversal
//! ([`traverse`]) against any archive format implementing
//! [`archive::OutputArchive`] / [`archive::InputArchive`].
//!
//! ```
//! use vc_serial::derive::Serial;
//!
//! #[derive(Serial, Default, Debug, PartialEq)]
//! struct Config {
//!     message: String,
//!     retries: u32,
//! }
//!
//! let config = Config { message: "Hello, World!".into(), retries: 3 };
//!
//! let json = vc_serial::to_json(&vc_serial::named("config", &config)).unwrap();
//! assert!(json.contains("\"config\""));
//!
//! let mut copy = Config::default();
//! vc_serial::from_json(&mut copy, &json).unwrap();
//! assert_eq!(config, copy);
//! ```
//!
//! ## Formats
//!
//! - JSON: [`to_json`] / [`from_json`]
//! - XML: [`to_xml`] / [`from_xml`]
//! - Binary (native endianness): [`to_binary`] / [`from_binary`]
//! - Portable binary (tagged endianness): [`to_portable_binary`] / [`from_portable_binary`]
//!
//! ## Ordering contract
//!
//! Saving is self-describing (named), loading is positional. Base fields are
//! always emitted before own fields, both in declaration order, so a load
//! is only valid against data written by a type of identical shape.

// -----------------------------------------------------------------------------
// Extern Self

// Generated code refers to `::vc_serial`, this alias makes it resolve inside
// the crate too (unit tests derive their own types).
extern crate self as vc_serial;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod convert;
mod error;
mod utils;

pub mod access;
pub mod archive;
pub mod impls;
pub mod info;
pub mod registry;
pub mod traverse;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use vc_serial_derive as derive;

pub use access::Aggregate;
pub use archive::{InputArchive, Load, Named, OutputArchive, Save, named};
pub use error::{SerialError, ShapeError};
pub use info::{Described, TypeMetadata, metadata_for};

pub use convert::{from_input_archive, to_output_archive};
pub use convert::{decode_json, from_json, from_json_reader, to_json, to_json_with, to_json_writer};
pub use convert::{decode_xml, from_xml, from_xml_reader, to_xml, to_xml_with, to_xml_writer};
pub use convert::{decode_binary, from_binary, to_binary};
pub use convert::{decode_portable_binary, from_portable_binary, to_portable_binary};
pub use convert::to_portable_binary_with;
