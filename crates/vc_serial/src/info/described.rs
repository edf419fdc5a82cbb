use crate::info::TypeMetadata;

/// A type with serialization metadata.
///
/// Implemented by `#[derive(Serial)]`. The returned reference is the same on
/// every call, and the metadata is built at most once per process.
///
/// A hand-written impl keeps its metadata in a [`MetadataCell`] or
/// [`GenericMetadataCell`].
///
/// [`MetadataCell`]: crate::info::MetadataCell
/// [`GenericMetadataCell`]: crate::info::GenericMetadataCell
///
/// # Rejected types
///
/// The derive refuses types it cannot describe. Enums:
///
/// ```compile_fail
/// #[derive(vc_serial::derive::Serial)]
/// enum Mode { On, Off }
/// ```
///
/// Unit structs, and structs left with neither fields nor bases:
///
/// ```compile_fail
/// #[derive(vc_serial::derive::Serial)]
/// struct Marker;
/// ```
///
/// ```compile_fail
/// #[derive(vc_serial::derive::Serial)]
/// struct Nothing {}
/// ```
///
/// ```compile_fail
/// #[derive(vc_serial::derive::Serial)]
/// struct Hidden {
///     #[serial(skip)]
///     cache: u64,
/// }
/// ```
///
/// Lifetime parameters, even on skipped fields:
///
/// ```compile_fail
/// #[derive(vc_serial::derive::Serial)]
/// struct Borrowed<'a> {
///     id: u32,
///     #[serial(skip)]
///     text: &'a str,
/// }
/// ```
///
/// Two own fields with the same archive name:
///
/// ```compile_fail
/// #[derive(vc_serial::derive::Serial)]
/// struct Twice {
///     id: u32,
///     #[serial(rename = "id")]
///     other: u32,
/// }
/// ```
///
/// The same types without the offending part compile:
///
/// ```
/// #[derive(vc_serial::derive::Serial)]
/// struct Borrowed {
///     id: u32,
///     #[serial(skip)]
///     text: &'static str,
/// }
///
/// #[derive(vc_serial::derive::Serial)]
/// struct Twice {
///     id: u32,
///     #[serial(rename = "other_id")]
///     other: u32,
/// }
/// ```
pub trait Described: 'static {
    fn metadata() -> &'static TypeMetadata;
}

/// Returns the metadata of `T`, building it on first use.
///
/// # Examples
///
/// ```
/// use vc_serial::{derive::Serial, metadata_for};
///
/// #[derive(Serial)]
/// struct Pair(u8, u8);
///
/// assert_eq!(metadata_for::<Pair>().field_names(), &["value0", "value1"]);
/// ```
#[inline]
pub fn metadata_for<T: Described>() -> &'static TypeMetadata {
    T::metadata()
}
