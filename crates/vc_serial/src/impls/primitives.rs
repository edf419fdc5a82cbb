use alloc::string::String;

use crate::SerialError;
use crate::archive::{InputArchive, Load, OutputArchive, Save, Scalar, ScalarKind};
use crate::impls::unexpected;

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl Save for $ty {
            #[inline]
            fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
                archive.write_scalar(Scalar::$variant(*self))
            }
        }

        impl Load for $ty {
            fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
                match archive.read_scalar(ScalarKind::$variant)? {
                    Scalar::$variant(v) => {
                        *self = v;
                        Ok(())
                    }
                    other => Err(unexpected(ScalarKind::$variant, &other)),
                }
            }
        }
    )*};
}

impl_scalar! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

macro_rules! impl_pointer_sized {
    ($($ty:ty => $wide:ty, $variant:ident);* $(;)?) => {$(
        impl Save for $ty {
            #[inline]
            fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
                archive.write_scalar(Scalar::$variant(*self as $wide))
            }
        }

        impl Load for $ty {
            fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
                let wide = match archive.read_scalar(ScalarKind::$variant)? {
                    Scalar::$variant(v) => v,
                    other => return Err(unexpected(ScalarKind::$variant, &other)),
                };
                *self = <$ty>::try_from(wide).map_err(|_| SerialError::OutOfRange {
                    kind: ScalarKind::$variant,
                    value: alloc::format!("{wide}"),
                })?;
                Ok(())
            }
        }
    )*};
}

impl_pointer_sized! {
    usize => u64, U64;
    isize => i64, I64;
}

impl Save for str {
    #[inline]
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        archive.write_scalar(Scalar::Str(self.into()))
    }
}

impl Save for String {
    #[inline]
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        self.as_str().save(archive)
    }
}

impl Load for String {
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        match archive.read_scalar(ScalarKind::Str)? {
            Scalar::Str(v) => {
                *self = v.into_owned();
                Ok(())
            }
            other => Err(unexpected(ScalarKind::Str, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::archive::{JsonInputArchive, Load};
    use crate::SerialError;

    #[test]
    fn usize_range_is_checked_on_load() {
        let mut archive = JsonInputArchive::parse(r#"{"value0": 18446744073709551615}"#).unwrap();
        let mut value: usize = 0;
        let result = value.load(&mut archive);
        if usize::BITS == 64 {
            assert!(result.is_ok());
            assert_eq!(value, usize::MAX);
        } else {
            assert!(matches!(result, Err(SerialError::OutOfRange { .. })));
        }
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let mut archive = JsonInputArchive::parse(r#"{"value0": "text"}"#).unwrap();
        let mut value = 0_i32;
        assert!(matches!(
            value.load(&mut archive),
            Err(SerialError::Mismatch { .. })
        ));
    }
}
