use alloc::string::String;

use thiserror::Error;

use crate::archive::ScalarKind;

// -----------------------------------------------------------------------------
// ShapeError

/// A type's metadata cannot drive a traversal.
///
/// `#[derive(Serial)]` reports the first three variants at compile time,
/// so at runtime they only come from hand-written [`TypeMetadata`] values.
///
/// [`TypeMetadata`]: crate::info::TypeMetadata
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("`{0}` has neither fields nor bases")]
    Empty(&'static str),
    #[error("`{type_path}` has {count} fields, the limit is {}", crate::info::MAX_FIELDS - 1)]
    TooManyFields { type_path: &'static str, count: usize },
    #[error("identifier `{ident}` in `{type_path}` exceeds {} bytes", crate::info::MAX_IDENTIFIER_LEN - 1)]
    IdentifierTooLong {
        type_path: &'static str,
        ident: &'static str,
    },
    #[error("`{type_path}` does not expose field {index}")]
    MissingField { type_path: &'static str, index: usize },
    #[error("`{type_path}` does not expose base {index}")]
    MissingBase { type_path: &'static str, index: usize },
}

// -----------------------------------------------------------------------------
// SerialError

/// Failure of a save or load.
///
/// Errors raised by a format backend are carried unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerialError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xml error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] alloc::string::FromUtf8Error),
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: String,
    },
    #[error("unexpected end of {0}")]
    UnexpectedEnd(&'static str),
    #[error("value `{value}` does not fit in {kind:?}")]
    OutOfRange { kind: ScalarKind, value: String },
    #[error("`{0}` is not a valid element name")]
    InvalidName(String),
    #[error("character {0:?} cannot be represented in xml text")]
    UnrepresentableChar(char),
    #[error("non-finite float {0} cannot be written")]
    NonFiniteFloat(f64),
    #[error("unbalanced archive nodes: {0}")]
    Unbalanced(&'static str),
    #[error("unknown endianness tag {0}")]
    Endianness(u8),
    #[error("expected a sequence of {expected} items, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

impl SerialError {
    #[inline]
    pub(crate) fn mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        Self::Mismatch {
            expected,
            found: found.into(),
        }
    }
}
