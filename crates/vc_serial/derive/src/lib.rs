//! See [`Serial`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static SERIAL_ATTRIBUTE_NAME: &str = "serial";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Serialization Derivation
///
/// `#[derive(Serial)]` implements the following traits for a struct:
///
/// - `Described`: the type's metadata, built once and cached.
/// - `Aggregate`: index-based access to fields and bases.
/// - `Save` / `Load`: the type as one archive object whose members are the
///   fields of its bases followed by its own fields.
///
/// Fields are serialized in declaration order under their names. Fields of
/// tuple structs are named `value0`, `value1`, ... by position.
/// Private fields are included like any other field.
///
/// ## Field Attributes
///
/// ### Bases
///
/// A field marked `base` is treated as a parent type: its own members are
/// written first, flattened into the same object, instead of as a nested
/// value. The field's type must itself derive `Serial`.
///
/// ```rust, ignore
/// #[derive(Serial)]
/// struct Parent { foo: String }
///
/// #[derive(Serial)]
/// struct Child {
///     #[serial(base)]
///     parent: Parent,
///     bar: String,
/// }
/// // Child is written as {"foo": .., "bar": ..}
/// ```
///
/// ### Skipping and renaming
///
/// ```rust, ignore
/// #[derive(Serial)]
/// struct Cached {
///     #[serial(rename = "input")]
///     source: String,
///     #[serial(skip)]
///     hash: u64, // never written, untouched on load
/// }
/// ```
///
/// ## Type Attributes
///
/// `#[serial(auto_register)]` submits a non-generic type to
/// `TypeRegistry::auto_register` (feature `auto_register`).
///
/// ## Errors
///
/// The derive fails to compile for enums, unions and unit structs, for types
/// with lifetime parameters, for 256 or more own fields, for identifiers of
/// 256 bytes or more, and for types left with neither fields nor bases.
/// A field whose type does not implement `Save` and `Load` fails the build too.
/// Each case is checked by a `compile_fail` doctest on `vc_serial::info::Described`,
/// and the 255/256 boundaries on `vc_serial::info::MAX_FIELDS` and `MAX_IDENTIFIER_LEN`.
#[proc_macro_derive(Serial, attributes(serial))]
pub fn derive_serial(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    impls::match_serial_impls(ast)
}
