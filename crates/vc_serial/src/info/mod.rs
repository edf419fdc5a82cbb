//! Per-type serialization metadata and its process-wide cache.
//!
//! ## Menu
//!
//! - [`TypeMetadata`]: the ordered description of one aggregate type:
//!   identity, own field names in declaration order, and base types.
//!     - [`BaseInfo`]: identity of one base plus a lazy link to its own metadata.
//!     - [`FieldDescriptor`]: an `(index, name)` pair yielded by [`TypeMetadata::fields`].
//!
//! - [`Described`]: a trait returning the `'static` metadata of a type,
//!   normally implemented by `#[derive(Serial)]`.
//!     - [`metadata_for`]: the free-function form.
//!
//! - Cells backing `Described` impls:
//!     - [`MetadataCell`]: for non-generic types, an [`OnceLock`](std::sync::OnceLock).
//!     - [`GenericMetadataCell`]: for generic types, a `TypeId`-keyed map behind a `RwLock`.
//!
//! - Capacity: [`MAX_FIELDS`] and [`MAX_IDENTIFIER_LEN`].

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod described;
mod type_meta;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericMetadataCell, MetadataCell};
pub use described::{Described, metadata_for};
pub use type_meta::{BaseInfo, FieldDescriptor, TypeMetadata};
pub use type_meta::{MAX_FIELDS, MAX_IDENTIFIER_LEN};
