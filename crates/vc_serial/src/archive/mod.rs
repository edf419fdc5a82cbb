//! The archive adapter surface and the bundled formats.
//!
//! ## Menu
//!
//! - [`OutputArchive`] / [`InputArchive`]: the narrow set of operations a
//!   format must support. Values are written as scalars, objects and
//!   sequences; objects and sequences nest.
//!
//! - [`Save`] / [`Load`]: how a value drives an archive. Implemented for
//!   primitives and std containers in [`impls`](crate::impls), and by
//!   `#[derive(Serial)]` for aggregates.
//!
//! - [`Scalar`] / [`ScalarKind`]: the leaf values exchanged with an archive.
//!
//! - [`Named`] / [`named`]: attach an explicit name to a value.
//!
//! - Formats:
//!     - [`JsonOutputArchive`] / [`JsonInputArchive`]
//!     - [`XmlOutputArchive`] / [`XmlInputArchive`]
//!     - [`BinaryOutputArchive`] / [`BinaryInputArchive`]
//!     - [`PortableBinaryOutputArchive`] / [`PortableBinaryInputArchive`]
//!
//! ## Names
//!
//! Output archives may record a name for each value. The name is announced by
//! [`OutputArchive::set_next_name`] and consumed by the next scalar, object or
//! sequence. A value without a name gets the placeholder `value{N}`, where `N`
//! counts the unnamed values of the enclosing node. Input archives never look
//! at names: values are read back in the order they were written.

// -----------------------------------------------------------------------------
// Modules

mod binary;
mod json;
mod named;
mod scalar;
mod xml;

// -----------------------------------------------------------------------------
// Exports

pub use binary::{BinaryInputArchive, BinaryOutputArchive, Endian};
pub use binary::{PortableBinaryInputArchive, PortableBinaryOutputArchive, PortableBinaryOptions};
pub use json::{JsonInputArchive, JsonOptions, JsonOutputArchive};
pub use named::{Named, named};
pub use scalar::{Scalar, ScalarKind};
pub use xml::{XmlInputArchive, XmlOptions, XmlOutputArchive};

use alloc::string::String;

use crate::SerialError;

// -----------------------------------------------------------------------------
// Save / Load

/// A value that can be written to an [`OutputArchive`].
pub trait Save {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError>;
}

/// A value that can be read back from an [`InputArchive`] in place.
///
/// On error the value may be partially overwritten.
pub trait Load {
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError>;
}

// -----------------------------------------------------------------------------
// OutputArchive

/// The write side of a format.
///
/// Every `begin_*` must be matched by the corresponding `end_*`.
pub trait OutputArchive {
    /// Names the next value written at the current level.
    fn set_next_name(&mut self, name: &str);

    fn write_scalar(&mut self, value: Scalar<'_>) -> Result<(), SerialError>;

    fn begin_object(&mut self) -> Result<(), SerialError>;

    fn end_object(&mut self) -> Result<(), SerialError>;

    /// Opens a sequence of `len` values.
    fn begin_sequence(&mut self, len: usize) -> Result<(), SerialError>;

    fn end_sequence(&mut self) -> Result<(), SerialError>;
}

impl dyn OutputArchive + '_ {
    /// Writes `value` under `name`.
    #[inline]
    pub fn write_named<T: Save + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), SerialError> {
        self.set_next_name(name);
        value.save(self)
    }

    /// Writes `value` without a name.
    #[inline]
    pub fn write<T: Save + ?Sized>(&mut self, value: &T) -> Result<(), SerialError> {
        value.save(self)
    }
}

// -----------------------------------------------------------------------------
// InputArchive

/// The read side of a format.
///
/// Reads are positional: the N-th read at a level returns the N-th value
/// written at that level, whatever its name.
pub trait InputArchive {
    /// Reads the next value as a scalar of `kind`.
    ///
    /// On success the returned scalar is always of the requested kind.
    fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>, SerialError>;

    fn begin_object(&mut self) -> Result<(), SerialError>;

    fn end_object(&mut self) -> Result<(), SerialError>;

    /// Opens a sequence and returns its length.
    fn begin_sequence(&mut self) -> Result<usize, SerialError>;

    fn end_sequence(&mut self) -> Result<(), SerialError>;
}

impl dyn InputArchive + '_ {
    /// Reads the next value into `value`.
    #[inline]
    pub fn read<T: Load + ?Sized>(&mut self, value: &mut T) -> Result<(), SerialError> {
        value.load(self)
    }
}

// -----------------------------------------------------------------------------
// Naming helpers

/// Name bookkeeping of one node in a self-describing archive.
#[derive(Debug, Default)]
pub(crate) struct NodeNames {
    unnamed: usize,
}

impl NodeNames {
    /// Returns `pending`, or the next `value{N}` placeholder of this node.
    pub(crate) fn resolve(&mut self, pending: Option<String>) -> String {
        pending.unwrap_or_else(|| {
            let name = alloc::format!("value{}", self.unnamed);
            self.unnamed += 1;
            name
        })
    }
}

#[cfg(test)]
mod tests {
    use super::NodeNames;
    use alloc::string::String;

    #[test]
    fn placeholders_count_unnamed_values_only() {
        let mut names = NodeNames::default();
        assert_eq!(names.resolve(None), "value0");
        assert_eq!(names.resolve(Some(String::from("x"))), "x");
        assert_eq!(names.resolve(None), "value1");
    }
}
