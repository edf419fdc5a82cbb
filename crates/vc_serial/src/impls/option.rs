use crate::SerialError;
use crate::archive::{InputArchive, Load, OutputArchive, Save};

impl<T: Save> Save for Option<T> {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        archive.begin_object()?;
        archive.write_named("valid", &self.is_some())?;
        if let Some(data) = self {
            archive.write_named("data", data)?;
        }
        archive.end_object()
    }
}

impl<T: Load + Default> Load for Option<T> {
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        archive.begin_object()?;
        let mut valid = false;
        archive.read(&mut valid)?;
        if valid {
            archive.read(self.get_or_insert_with(T::default))?;
        } else {
            *self = None;
        }
        archive.end_object()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::archive::{JsonInputArchive, JsonOptions, JsonOutputArchive, Load, OutputArchive};

    #[test]
    fn none_has_no_data_member() {
        let mut archive = JsonOutputArchive::with_options(Vec::new(), JsonOptions::compact());
        let out: &mut dyn OutputArchive = &mut archive;
        out.write_named("a", &Some(3_u8)).unwrap();
        out.write_named("b", &None::<u8>).unwrap();
        let text = String::from_utf8(archive.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"a":{"valid":true,"data":3},"b":{"valid":false}}"#
        );

        let mut input = JsonInputArchive::parse(&text).unwrap();
        let mut a = None::<u8>;
        let mut b = Some(9_u8);
        a.load(&mut input).unwrap();
        b.load(&mut input).unwrap();
        assert_eq!((a, b), (Some(3), None));
    }
}
