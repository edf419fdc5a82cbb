//! The metadata-driven save/load traversal.
//!
//! For a value of an aggregate type, [`save_fields`] writes:
//!
//! 1. the fields of every base, in base declaration order, recursively and
//!    flattened into the current node;
//! 2. every own field, in declaration order, under its field name.
//!
//! [`load_fields`] mirrors the same order and reads positionally.
//! [`save_object`] / [`load_object`] wrap the fields in one object node and
//! back the `Save` / `Load` impls generated by `#[derive(Serial)]`.
//!
//! The recursion follows static types. A value saved through a base view
//! carries only the base's fields, loading it through a derived view reads
//! the wrong members.

use crate::archive::{InputArchive, OutputArchive};
use crate::{Aggregate, SerialError, ShapeError};

/// Writes the members of `value` into the current node.
pub fn save_fields(value: &dyn Aggregate, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
    let meta = value.aggregate_metadata();
    meta.check_shape()?;
    log::trace!("saving `{}`", meta.type_path());

    for (index, info) in meta.bases().iter().enumerate() {
        let base = value.base_at(index).ok_or(ShapeError::MissingBase {
            type_path: meta.type_path(),
            index,
        })?;
        debug_assert_eq!(base.aggregate_metadata().type_id(), info.type_id());
        save_fields(base, archive)?;
    }

    for field in meta.fields() {
        let member = value.field_at(field.index).ok_or(ShapeError::MissingField {
            type_path: meta.type_path(),
            index: field.index,
        })?;
        archive.write_named(field.name, member)?;
    }
    Ok(())
}

/// Reads the members of `value` from the current node, in [`save_fields`] order.
pub fn load_fields(value: &mut dyn Aggregate, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
    let meta = value.aggregate_metadata();
    meta.check_shape()?;
    log::trace!("loading `{}`", meta.type_path());

    for index in 0..meta.base_count() {
        let base = value.base_at_mut(index).ok_or(ShapeError::MissingBase {
            type_path: meta.type_path(),
            index,
        })?;
        load_fields(base, archive)?;
    }

    for index in 0..meta.field_count() {
        let member = value.field_at_mut(index).ok_or(ShapeError::MissingField {
            type_path: meta.type_path(),
            index,
        })?;
        archive.read(member)?;
    }
    Ok(())
}

/// Writes `value` as one object node.
pub fn save_object(value: &dyn Aggregate, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
    archive.begin_object()?;
    save_fields(value, archive)?;
    archive.end_object()
}

/// Reads `value` from one object node.
pub fn load_object(value: &mut dyn Aggregate, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
    archive.begin_object()?;
    load_fields(value, archive)?;
    archive.end_object()
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::derive::Serial;
    use crate::info::{BaseInfo, Described, MetadataCell, TypeMetadata};
    use crate::{Aggregate, Load, Save, SerialError, ShapeError};
    use crate::{decode_json, from_json, to_json_with};
    use crate::archive::JsonOptions;

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Root {
        origin: u8,
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Left {
        #[serial(base)]
        root: Root,
        left: u8,
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Right {
        right: u8,
    }

    #[derive(Serial, Default, Debug, PartialEq)]
    struct Leaf {
        #[serial(base)]
        left: Left,
        #[serial(base)]
        right: Right,
        leaf: u8,
    }

    fn compact<T: Save>(value: &T) -> String {
        to_json_with(value, JsonOptions::compact()).unwrap()
    }

    #[test]
    fn bases_come_first_and_flattened() {
        let leaf = Leaf {
            left: Left { root: Root { origin: 1 }, left: 2 },
            right: Right { right: 3 },
            leaf: 4,
        };
        assert_eq!(
            compact(&leaf),
            r#"{"value0":{"origin":1,"left":2,"right":3,"leaf":4}}"#
        );
    }

    #[test]
    fn load_follows_save_order() {
        let text = r#"{"value0":{"a":10,"b":20,"c":30,"d":40}}"#;
        let leaf: Leaf = decode_json(text).unwrap();
        assert_eq!(leaf.left.root.origin, 10);
        assert_eq!(leaf.left.left, 20);
        assert_eq!(leaf.right.right, 30);
        assert_eq!(leaf.leaf, 40);
    }

    #[test]
    fn field_order_is_deterministic() {
        let leaf = Leaf::default();
        let first = compact(&leaf);
        for _ in 0..3 {
            assert_eq!(compact(&leaf), first);
        }
        let options = JsonOptions::default();
        assert_eq!(
            to_json_with(&leaf, options).unwrap(),
            to_json_with(&leaf, options).unwrap()
        );
    }

    // A hand-written aggregate that does not expose its declared field.
    struct Broken;

    impl Described for Broken {
        fn metadata() -> &'static TypeMetadata {
            static CELL: MetadataCell = MetadataCell::new();
            CELL.get_or_init(|| TypeMetadata::new::<Broken>("Broken", &["ghost"], &[BaseInfo::of::<Root>()]))
        }
    }

    impl Aggregate for Broken {
        fn aggregate_metadata(&self) -> &'static TypeMetadata {
            Self::metadata()
        }
        fn field_at(&self, _: usize) -> Option<&dyn Save> {
            None
        }
        fn field_at_mut(&mut self, _: usize) -> Option<&mut dyn Load> {
            None
        }
        fn base_at(&self, _: usize) -> Option<&dyn Aggregate> {
            None
        }
        fn base_at_mut(&mut self, _: usize) -> Option<&mut dyn Aggregate> {
            None
        }
    }

    impl Save for Broken {
        fn save(&self, archive: &mut dyn crate::OutputArchive) -> Result<(), SerialError> {
            super::save_object(self, archive)
        }
    }

    #[test]
    fn missing_members_surface_as_shape_errors() {
        let err = crate::to_json(&Broken).unwrap_err();
        assert!(matches!(
            err,
            SerialError::Shape(ShapeError::MissingBase { index: 0, .. })
        ));
    }

    // Metadata with neither fields nor bases is refused before anything is written.
    struct Hollow;

    impl Described for Hollow {
        fn metadata() -> &'static TypeMetadata {
            static CELL: MetadataCell = MetadataCell::new();
            CELL.get_or_init(|| TypeMetadata::new::<Hollow>("Hollow", &[], &[]))
        }
    }

    impl Aggregate for Hollow {
        fn aggregate_metadata(&self) -> &'static TypeMetadata {
            Self::metadata()
        }
        fn field_at(&self, _: usize) -> Option<&dyn Save> {
            None
        }
        fn field_at_mut(&mut self, _: usize) -> Option<&mut dyn Load> {
            None
        }
        fn base_at(&self, _: usize) -> Option<&dyn Aggregate> {
            None
        }
        fn base_at_mut(&mut self, _: usize) -> Option<&mut dyn Aggregate> {
            None
        }
    }

    #[test]
    fn empty_shape_is_refused() {
        let mut bytes = Vec::new();
        let mut archive = crate::archive::BinaryOutputArchive::new(&mut bytes);
        let err = super::save_fields(&Hollow, &mut archive).unwrap_err();
        assert!(matches!(err, SerialError::Shape(ShapeError::Empty(_))));

        let mut input = crate::archive::BinaryInputArchive::new(&[0_u8; 0][..]);
        let err = super::load_fields(&mut Hollow, &mut input).unwrap_err();
        assert!(matches!(err, SerialError::Shape(ShapeError::Empty(_))));
    }

    #[test]
    fn reload_into_existing_value() {
        let text = compact(&Right { right: 8 });
        let mut right = Right { right: 1 };
        from_json(&mut right, &text).unwrap();
        assert_eq!(right, Right { right: 8 });
    }
}
