use alloc::boxed::Box;
use core::any::TypeId;
use core::fmt;

use crate::ShapeError;
use crate::info::Described;

// -----------------------------------------------------------------------------
// Capacity

/// Exclusive upper bound on the number of own fields of one type.
///
/// A type with 255 fields is accepted, one with 256 is not. `#[derive(Serial)]`
/// enforces the bound at compile time.
///
/// ```
/// use vc_serial::{derive::Serial, metadata_for};
///
/// // `Wide` is a tuple struct of 255 `u8` fields.
/// # #[derive(Serial)]
/// # struct Wide(
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// # );
/// assert_eq!(metadata_for::<Wide>().field_count(), 255);
/// assert_eq!(metadata_for::<Wide>().field_name(254), Some("value254"));
/// ```
///
/// ```compile_fail
/// use vc_serial::derive::Serial;
///
/// // `TooWide` is a tuple struct of 256 `u8` fields.
/// # #[derive(Serial)]
/// # struct TooWide(
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// #     u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8,
/// # );
/// ```
pub const MAX_FIELDS: usize = 256;

/// Exclusive upper bound, in bytes, on type and field identifiers.
///
/// ```
/// use vc_serial::{derive::Serial, metadata_for};
///
/// #[derive(Serial)]
/// struct Long {
///     aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa: u8,
/// }
///
/// assert_eq!(metadata_for::<Long>().field_name(0).map(str::len), Some(255));
/// ```
///
/// ```compile_fail
/// use vc_serial::derive::Serial;
///
/// #[derive(Serial)]
/// struct TooLong {
///     aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa: u8,
/// }
/// ```
pub const MAX_IDENTIFIER_LEN: usize = 256;

// -----------------------------------------------------------------------------
// BaseInfo

/// Identity of a base type.
///
/// The base's own metadata is reached through a function pointer, so building
/// a [`TypeMetadata`] never forces the metadata of its bases.
#[derive(Clone, Copy)]
pub struct BaseInfo {
    type_id: TypeId,
    type_path: &'static str,
    metadata: fn() -> &'static TypeMetadata,
}

impl BaseInfo {
    /// Describes the base type `B`.
    #[inline]
    pub fn of<B: Described>() -> Self {
        Self {
            type_id: TypeId::of::<B>(),
            type_path: core::any::type_name::<B>(),
            metadata: B::metadata,
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Returns the base's own metadata, building it on first use.
    #[inline]
    pub fn metadata(&self) -> &'static TypeMetadata {
        (self.metadata)()
    }
}

impl fmt::Debug for BaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BaseInfo").field(&self.type_path).finish()
    }
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One own field of a type: its position and its archive name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub index: usize,
    pub name: &'static str,
}

// -----------------------------------------------------------------------------
// TypeMetadata

/// The ordered description of one serializable type.
///
/// Created once per type (see [`Described`]) and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use vc_serial::{derive::Serial, Described};
///
/// #[derive(Serial)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let meta = Point::metadata();
/// assert_eq!(meta.type_ident(), "Point");
/// assert_eq!(meta.field_names(), &["x", "y"]);
/// assert_eq!(meta.base_count(), 0);
/// assert!(meta.check_shape().is_ok());
/// ```
pub struct TypeMetadata {
    type_id: TypeId,
    type_path: &'static str,
    type_ident: &'static str,
    field_names: Box<[&'static str]>,
    bases: Box<[BaseInfo]>,
    shape: Result<(), ShapeError>,
}

impl TypeMetadata {
    /// Creates the metadata of `T`.
    ///
    /// `field_names` and `bases` must be in declaration order.
    /// An invalid shape is not rejected here; it is recorded and reported by
    /// [`check_shape`](Self::check_shape) before any traversal.
    pub fn new<T: ?Sized + 'static>(
        type_ident: &'static str,
        field_names: &[&'static str],
        bases: &[BaseInfo],
    ) -> Self {
        let type_path = core::any::type_name::<T>();
        let shape = validate(type_path, type_ident, field_names, bases.len());

        Self {
            type_id: TypeId::of::<T>(),
            type_path,
            type_ident,
            field_names: field_names.into(),
            bases: bases.into(),
            shape,
        }
    }

    /// Like [`new`](Self::new), but fails on an invalid shape.
    pub fn try_new<T: ?Sized + 'static>(
        type_ident: &'static str,
        field_names: &[&'static str],
        bases: &[BaseInfo],
    ) -> Result<Self, ShapeError> {
        let meta = Self::new::<T>(type_ident, field_names, bases);
        meta.shape.clone()?;
        Ok(meta)
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The full type path, as given by [`core::any::type_name`].
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// The bare identifier, without module path or generics.
    #[inline]
    pub fn type_ident(&self) -> &'static str {
        self.type_ident
    }

    /// Own field names in declaration order.
    #[inline]
    pub fn field_names(&self) -> &[&'static str] {
        &self.field_names
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    /// Returns the name of own field `index`, if present.
    #[inline]
    pub fn field_name(&self, index: usize) -> Option<&'static str> {
        self.field_names.get(index).copied()
    }

    /// Returns the index of the own field called `name`, if present.
    ///
    /// This is O(N).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_names.iter().position(|s| *s == name)
    }

    /// Own fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.field_names
            .iter()
            .enumerate()
            .map(|(index, &name)| FieldDescriptor { index, name })
    }

    /// Base types in declaration order.
    #[inline]
    pub fn bases(&self) -> &[BaseInfo] {
        &self.bases
    }

    #[inline]
    pub fn base_count(&self) -> usize {
        self.bases.len()
    }

    /// Returns the shape verdict computed at construction.
    #[inline]
    pub fn check_shape(&self) -> Result<(), ShapeError> {
        self.shape.clone()
    }
}

impl fmt::Debug for TypeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("type_path", &self.type_path)
            .field("field_names", &self.field_names)
            .field("bases", &self.bases)
            .finish()
    }
}

fn validate(
    type_path: &'static str,
    type_ident: &'static str,
    field_names: &[&'static str],
    base_count: usize,
) -> Result<(), ShapeError> {
    if field_names.is_empty() && base_count == 0 {
        return Err(ShapeError::Empty(type_path));
    }
    if field_names.len() >= MAX_FIELDS {
        return Err(ShapeError::TooManyFields {
            type_path,
            count: field_names.len(),
        });
    }
    let too_long = core::iter::once(type_ident)
        .chain(field_names.iter().copied())
        .find(|ident| ident.len() >= MAX_IDENTIFIER_LEN);
    if let Some(ident) = too_long {
        return Err(ShapeError::IdentifierTooLong { type_path, ident });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;

    struct Probe;

    fn leaked_names(count: usize) -> Vec<&'static str> {
        (0..count)
            .map(|i| -> &'static str { Box::leak(alloc::format!("f{i}").into_boxed_str()) })
            .collect()
    }

    #[test]
    fn names_keep_declaration_order() {
        let meta = TypeMetadata::new::<Probe>("Probe", &["zeta", "alpha", "mid"], &[]);
        assert_eq!(meta.field_names(), &["zeta", "alpha", "mid"]);
        assert_eq!(meta.index_of("alpha"), Some(1));
        assert_eq!(meta.field_name(3), None);

        let fields: Vec<_> = meta.fields().collect();
        assert_eq!(fields[2], FieldDescriptor { index: 2, name: "mid" });
    }

    #[test]
    fn field_capacity_boundary() {
        let names = leaked_names(MAX_FIELDS - 1);
        let meta = TypeMetadata::try_new::<Probe>("Probe", &names, &[]).unwrap();
        assert_eq!(meta.field_count(), 255);

        let names = leaked_names(MAX_FIELDS);
        let err = TypeMetadata::try_new::<Probe>("Probe", &names, &[]).unwrap_err();
        assert!(matches!(err, ShapeError::TooManyFields { count: 256, .. }));
    }

    #[test]
    fn identifier_capacity_boundary() {
        let ok: &'static str = Box::leak(String::from("a").repeat(255).into_boxed_str());
        assert!(TypeMetadata::try_new::<Probe>("Probe", &[ok], &[]).is_ok());

        let long: &'static str = Box::leak(String::from("a").repeat(256).into_boxed_str());
        let err = TypeMetadata::try_new::<Probe>("Probe", &[long], &[]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::IdentifierTooLong {
                type_path: core::any::type_name::<Probe>(),
                ident: long,
            }
        );
        assert!(TypeMetadata::try_new::<Probe>(long, &["x"], &[]).is_err());
    }

    #[test]
    fn empty_shape_is_recorded() {
        let meta = TypeMetadata::new::<Probe>("Probe", &[], &[]);
        assert!(matches!(meta.check_shape(), Err(ShapeError::Empty(_))));
    }
}
