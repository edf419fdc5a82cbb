//! Items referenced by code generated with `#[derive(Serial)]`.
//!
//! Not public API.

/// Static registration through `inventory`.
#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::info::Described;
    use crate::registry::TypeRegistry;

    /// One submitted registration function.
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    inventory::collect!(__AutoRegisterFunc);

    /// Registers `Self` and its bases.
    pub trait __RegisterType {
        fn __register(registry: &mut TypeRegistry);
    }

    impl<T: Described> __RegisterType for T {
        #[inline]
        fn __register(registry: &mut TypeRegistry) {
            registry.register::<T>();
        }
    }

    // Always submitted, so an empty iteration means the platform has no
    // static constructor support.
    fn __avail(_: &mut TypeRegistry) {}

    inventory::submit! { __AutoRegisterFunc(__avail) }

    /// Runs every submitted registration. Returns `false` if none could run.
    pub fn __register_types(registry: &mut TypeRegistry) -> bool {
        let mut count = 0_usize;
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
            count += 1;
        }
        count > 0
    }
}
