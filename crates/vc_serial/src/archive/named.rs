use crate::SerialError;
use crate::archive::{OutputArchive, Save};

/// A value paired with an explicit archive name.
///
/// Without a name, a top-level value is written as `value0`.
///
/// # Examples
///
/// ```
/// let json = vc_serial::to_json(&vc_serial::named("hello", &"Hello, World!")).unwrap();
/// assert!(json.contains("\"hello\": \"Hello, World!\""));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Named<'a, T: ?Sized> {
    pub name: &'a str,
    pub value: &'a T,
}

/// Pairs `value` with `name`.
#[inline]
pub fn named<'a, T: ?Sized>(name: &'a str, value: &'a T) -> Named<'a, T> {
    Named { name, value }
}

impl<T: Save + ?Sized> Save for Named<'_, T> {
    #[inline]
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        archive.write_named(self.name, self.value)
    }
}
