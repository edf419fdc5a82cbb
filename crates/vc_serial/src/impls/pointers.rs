use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;

use crate::SerialError;
use crate::archive::{InputArchive, Load, OutputArchive, Save};

impl<T: Save + ?Sized> Save for &T {
    #[inline]
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        (**self).save(archive)
    }
}

impl<T: Save + ?Sized> Save for Box<T> {
    #[inline]
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        (**self).save(archive)
    }
}

impl<T: Load + ?Sized> Load for Box<T> {
    #[inline]
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        (**self).load(archive)
    }
}

macro_rules! impl_shared {
    ($($ptr:ident),*) => {$(
        impl<T: Save + ?Sized> Save for $ptr<T> {
            #[inline]
            fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
                (**self).save(archive)
            }
        }

        /// Loads in place when the pointer is unique, otherwise into a new allocation.
        impl<T: Load + Default> Load for $ptr<T> {
            fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
                if let Some(inner) = $ptr::get_mut(self) {
                    return inner.load(archive);
                }
                let mut value = T::default();
                value.load(archive)?;
                *self = $ptr::new(value);
                Ok(())
            }
        }
    )*};
}

impl_shared!(Rc, Arc);

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::sync::Arc;

    use crate::archive::{JsonInputArchive, Load};

    #[test]
    fn shared_load_leaves_other_owners_untouched() {
        let mut archive = JsonInputArchive::parse(r#"{"value0": "new"}"#).unwrap();
        let mut first = Rc::new(String::from("old"));
        let second = Rc::clone(&first);
        first.load(&mut archive).unwrap();
        assert_eq!(*first, "new");
        assert_eq!(*second, "old");
    }

    #[test]
    fn unique_arc_loads_in_place() {
        let mut archive = JsonInputArchive::parse(r#"{"value0": 5}"#).unwrap();
        let mut value = Arc::new(1_u64);
        let before = Arc::as_ptr(&value);
        value.load(&mut archive).unwrap();
        assert_eq!(*value, 5);
        assert_eq!(Arc::as_ptr(&value), before);
    }
}
