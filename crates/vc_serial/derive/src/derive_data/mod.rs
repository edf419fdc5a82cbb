//! Parsing and validation of the derive input.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod serial_meta;
mod serial_struct;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, FieldRole, TypeAttributes};
pub(crate) use serial_meta::SerialMeta;
pub(crate) use serial_struct::SerialStruct;

/// Exclusive bound on own fields, mirrors `vc_serial::info::MAX_FIELDS`.
pub(crate) const MAX_FIELDS: usize = 256;

/// Exclusive bound on identifier bytes, mirrors `vc_serial::info::MAX_IDENTIFIER_LEN`.
pub(crate) const MAX_IDENTIFIER_LEN: usize = 256;
