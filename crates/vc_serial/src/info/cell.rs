//! Static storage for [`TypeMetadata`].
//!
//! A `Described` impl keeps its metadata in a `static` declared inside
//! [`Described::metadata`](crate::Described::metadata).
//!
//! - Non-generic types use [`MetadataCell`], a plain [`OnceLock`].
//! - For a generic type the `static` inside the function is shared by every
//!   instantiation, so [`GenericMetadataCell`] keys its entries by [`TypeId`].

use alloc::boxed::Box;
use core::any::TypeId;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::info::TypeMetadata;
use crate::utils::TypeIdMap;

// -----------------------------------------------------------------------------
// MetadataCell

/// Storage for the metadata of a non-generic type.
///
/// # Examples
///
/// ```
/// use vc_serial::info::{Described, MetadataCell, TypeMetadata};
///
/// struct Plain {
///     a: u32,
/// }
///
/// impl Described for Plain {
///     fn metadata() -> &'static TypeMetadata {
///         static CELL: MetadataCell = MetadataCell::new();
///         CELL.get_or_init(|| TypeMetadata::new::<Plain>("Plain", &["a"], &[]))
///     }
/// }
///
/// assert!(core::ptr::eq(Plain::metadata(), Plain::metadata()));
/// ```
pub struct MetadataCell(OnceLock<TypeMetadata>);

impl Default for MetadataCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored metadata, building it with `f` on first access.
    ///
    /// Concurrent first accesses block until the single construction ends.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeMetadata) -> &TypeMetadata {
        self.0.get_or_init(|| built(f()))
    }
}

// -----------------------------------------------------------------------------
// GenericMetadataCell

/// Storage for the metadata of every instantiation of a generic type.
///
/// Lookups only take the read lock. On a miss the write lock is taken and the
/// map is checked again before `f` runs, so each type is built exactly once.
/// `f` runs under the write lock and must not access the same cell.
///
/// # Examples
///
/// ```
/// use vc_serial::info::{Described, GenericMetadataCell, TypeMetadata};
///
/// struct Wrapper<T>(T);
///
/// impl<T: 'static> Described for Wrapper<T> {
///     fn metadata() -> &'static TypeMetadata {
///         static CELL: GenericMetadataCell = GenericMetadataCell::new();
///         CELL.get_or_insert::<Self>(|| TypeMetadata::new::<Self>("Wrapper", &["value0"], &[]))
///     }
/// }
///
/// assert_ne!(Wrapper::<u8>::metadata().type_id(), Wrapper::<u16>::metadata().type_id());
/// assert!(Wrapper::<u8>::metadata().type_path().ends_with("Wrapper<u8>"));
/// ```
pub struct GenericMetadataCell(RwLock<TypeIdMap<&'static TypeMetadata>>);

impl Default for GenericMetadataCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl GenericMetadataCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the metadata stored for `G`, building it with `f` on first access.
    #[inline(always)]
    pub fn get_or_insert<G: ?Sized + 'static>(
        &self,
        f: impl FnOnce() -> TypeMetadata,
    ) -> &'static TypeMetadata {
        // Separate to reduce code compilation times
        match self.get_by_type_id(TypeId::of::<G>()) {
            Some(meta) => meta,
            None => self.insert_by_type_id(TypeId::of::<G>(), f),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static TypeMetadata> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> TypeMetadata,
    ) -> &'static TypeMetadata {
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(Box::new(built(f()))))
    }
}

#[inline]
fn built(meta: TypeMetadata) -> TypeMetadata {
    log::debug!(
        "built serialization metadata for `{}`: {} fields, {} bases",
        meta.type_path(),
        meta.field_count(),
        meta.base_count(),
    );
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::Described;
    use core::marker::PhantomData;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Racy<T>(PhantomData<T>);

    impl<T: 'static> Described for Racy<T> {
        fn metadata() -> &'static TypeMetadata {
            static CELL: GenericMetadataCell = GenericMetadataCell::new();
            CELL.get_or_insert::<Self>(|| {
                BUILDS.fetch_add(1, Ordering::SeqCst);
                std::thread::yield_now();
                TypeMetadata::new::<Self>("Racy", &["value0"], &[])
            })
        }
    }

    #[test]
    fn generic_cell_builds_once_under_race() {
        const THREADS: usize = 8;
        let barrier = Barrier::new(THREADS);

        let seen: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        let meta = Racy::<[u8; 3]>::metadata();
                        meta as *const TypeMetadata as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn generic_cell_separates_instantiations() {
        let a = Racy::<i8>::metadata();
        let b = Racy::<i16>::metadata();
        assert!(!core::ptr::eq(a, b));
        assert_eq!(a.type_id(), TypeId::of::<Racy<i8>>());
        assert!(core::ptr::eq(a, Racy::<i8>::metadata()));
    }

    #[test]
    fn plain_cell_builds_once() {
        static CELL: MetadataCell = MetadataCell::new();
        let mut calls = 0;
        for _ in 0..4 {
            CELL.get_or_init(|| {
                calls += 1;
                TypeMetadata::new::<u8>("u8", &["value0"], &[])
            });
        }
        assert_eq!(calls, 1);
    }
}
