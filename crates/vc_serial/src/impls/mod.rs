//! [`Save`] and [`Load`] for primitives and standard containers.
//!
//! ## Layout
//!
//! - `bool`, `char`, integers and floats are scalars. `usize` and `isize`
//!   are written as 64-bit values.
//! - `String` / `str` are string scalars.
//! - `Vec`, `VecDeque`, `[T; N]` and the std sets are sequences.
//! - `BTreeMap` / `HashMap` are sequences of `{key, value}` objects.
//! - `Option<T>` is a `{valid, data}` object; `data` is absent for `None`.
//! - `Box`, `Rc`, `Arc` and `&T` are written as the value they point to.
//!   Shared pointers are not tracked, two `Rc`s to one value are written
//!   twice and loaded as two values.
//!
//! [`Save`]: crate::Save
//! [`Load`]: crate::Load

mod collections;
mod option;
mod pointers;
mod primitives;

use crate::SerialError;
use crate::archive::{Scalar, ScalarKind};

/// Read preallocation is capped so a corrupt length cannot exhaust memory.
pub(crate) const MAX_PREALLOC: usize = 4096;

pub(crate) fn unexpected(kind: ScalarKind, found: &Scalar<'_>) -> SerialError {
    SerialError::mismatch(kind.name(), found.kind().name())
}
