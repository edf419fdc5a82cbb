//! Structural access to the fields and bases of an aggregate.

use crate::archive::{Load, Save};
use crate::info::TypeMetadata;

/// Index-based access to the members described by a type's [`TypeMetadata`].
///
/// Implemented by `#[derive(Serial)]`, which emits exactly one arm per own
/// field and per base, so every index below `field_count` / `base_count`
/// resolves. A hand-written impl returning `None` for such an index makes
/// the traversal fail with [`ShapeError::MissingField`] or
/// [`ShapeError::MissingBase`].
///
/// # Examples
///
/// ```
/// use vc_serial::{Aggregate, derive::Serial};
///
/// #[derive(Serial)]
/// struct Base {
///     id: u32,
/// }
///
/// #[derive(Serial)]
/// struct Item {
///     #[serial(base)]
///     base: Base,
///     label: String,
/// }
///
/// let item = Item { base: Base { id: 7 }, label: "seven".into() };
///
/// assert_eq!(item.aggregate_metadata().field_names(), &["label"]);
/// assert!(item.field_at(0).is_some());
/// assert!(item.field_at(1).is_none());
///
/// let base = item.base_at(0).unwrap();
/// assert_eq!(base.aggregate_metadata().type_ident(), "Base");
/// ```
///
/// [`ShapeError::MissingField`]: crate::ShapeError::MissingField
/// [`ShapeError::MissingBase`]: crate::ShapeError::MissingBase
pub trait Aggregate {
    fn aggregate_metadata(&self) -> &'static TypeMetadata;

    /// Own field `index`, for saving.
    fn field_at(&self, index: usize) -> Option<&dyn Save>;

    /// Own field `index`, for loading.
    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Load>;

    /// Base `index`, in declaration order.
    fn base_at(&self, index: usize) -> Option<&dyn Aggregate>;

    fn base_at_mut(&mut self, index: usize) -> Option<&mut dyn Aggregate>;
}
