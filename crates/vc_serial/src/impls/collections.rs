use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::{HashMap, HashSet};

use crate::SerialError;
use crate::archive::{InputArchive, Load, OutputArchive, Save};
use crate::impls::MAX_PREALLOC;

// -----------------------------------------------------------------------------
// Helpers

fn save_items<'a, T, I>(archive: &mut dyn OutputArchive, len: usize, items: I) -> Result<(), SerialError>
where
    T: Save + 'a,
    I: Iterator<Item = &'a T>,
{
    archive.begin_sequence(len)?;
    for item in items {
        archive.write(item)?;
    }
    archive.end_sequence()
}

/// Reads a sequence, handing each freshly loaded item to `push`.
fn load_items<T: Load + Default>(
    archive: &mut dyn InputArchive,
    mut push: impl FnMut(T),
) -> Result<(), SerialError> {
    let len = archive.begin_sequence()?;
    for _ in 0..len {
        let mut item = T::default();
        archive.read(&mut item)?;
        push(item);
    }
    archive.end_sequence()
}

fn save_entries<'a, K, V, I>(archive: &mut dyn OutputArchive, len: usize, entries: I) -> Result<(), SerialError>
where
    K: Save + 'a,
    V: Save + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    archive.begin_sequence(len)?;
    for (key, value) in entries {
        archive.begin_object()?;
        archive.write_named("key", key)?;
        archive.write_named("value", value)?;
        archive.end_object()?;
    }
    archive.end_sequence()
}

fn load_entries<K, V>(archive: &mut dyn InputArchive, mut insert: impl FnMut(K, V)) -> Result<(), SerialError>
where
    K: Load + Default,
    V: Load + Default,
{
    let len = archive.begin_sequence()?;
    for _ in 0..len {
        let mut key = K::default();
        let mut value = V::default();
        archive.begin_object()?;
        archive.read(&mut key)?;
        archive.read(&mut value)?;
        archive.end_object()?;
        insert(key, value);
    }
    archive.end_sequence()
}

// -----------------------------------------------------------------------------
// Sequences

impl<T: Save> Save for [T] {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        save_items(archive, self.len(), self.iter())
    }
}

impl<T: Save> Save for Vec<T> {
    #[inline]
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        self.as_slice().save(archive)
    }
}

impl<T: Load + Default> Load for Vec<T> {
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        self.clear();
        let len = archive.begin_sequence()?;
        self.reserve(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let mut item = T::default();
            archive.read(&mut item)?;
            self.push(item);
        }
        archive.end_sequence()
    }
}

impl<T: Save> Save for VecDeque<T> {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        save_items(archive, self.len(), self.iter())
    }
}

impl<T: Load + Default> Load for VecDeque<T> {
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        self.clear();
        load_items(archive, |item| self.push_back(item))
    }
}

impl<T: Save, const N: usize> Save for [T; N] {
    #[inline]
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        self.as_slice().save(archive)
    }
}

impl<T: Load, const N: usize> Load for [T; N] {
    /// Loads in place; the stored length must be exactly `N`.
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        let len = archive.begin_sequence()?;
        if len != N {
            return Err(SerialError::LengthMismatch {
                expected: N,
                found: len,
            });
        }
        for item in self.iter_mut() {
            archive.read(item)?;
        }
        archive.end_sequence()
    }
}

// -----------------------------------------------------------------------------
// Sets

impl<T: Save> Save for BTreeSet<T> {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        save_items(archive, self.len(), self.iter())
    }
}

impl<T: Load + Default + Ord> Load for BTreeSet<T> {
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        self.clear();
        load_items(archive, |item| {
            self.insert(item);
        })
    }
}

impl<T: Save, S> Save for HashSet<T, S> {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        save_items(archive, self.len(), self.iter())
    }
}

impl<T, S> Load for HashSet<T, S>
where
    T: Load + Default + Eq + Hash,
    S: BuildHasher,
{
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        self.clear();
        load_items(archive, |item| {
            self.insert(item);
        })
    }
}

// -----------------------------------------------------------------------------
// Maps

impl<K: Save, V: Save> Save for BTreeMap<K, V> {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        save_entries(archive, self.len(), self.iter())
    }
}

impl<K, V> Load for BTreeMap<K, V>
where
    K: Load + Default + Ord,
    V: Load + Default,
{
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        self.clear();
        load_entries(archive, |key, value| {
            self.insert(key, value);
        })
    }
}

impl<K: Save, V: Save, S> Save for HashMap<K, V, S> {
    fn save(&self, archive: &mut dyn OutputArchive) -> Result<(), SerialError> {
        save_entries(archive, self.len(), self.iter())
    }
}

impl<K, V, S> Load for HashMap<K, V, S>
where
    K: Load + Default + Eq + Hash,
    V: Load + Default,
    S: BuildHasher,
{
    fn load(&mut self, archive: &mut dyn InputArchive) -> Result<(), SerialError> {
        self.clear();
        load_entries(archive, |key, value| {
            self.insert(key, value);
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::{BTreeMap, VecDeque};
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::archive::{JsonInputArchive, JsonOptions, JsonOutputArchive, Load, OutputArchive};
    use crate::{SerialError, Save};

    fn json<T: Save + ?Sized>(value: &T) -> String {
        let mut archive = JsonOutputArchive::with_options(Vec::new(), JsonOptions::compact());
        (&mut archive as &mut dyn OutputArchive).write(value).unwrap();
        String::from_utf8(archive.finish().unwrap()).unwrap()
    }

    #[test]
    fn maps_are_key_value_sequences() {
        let map = BTreeMap::from([(2_u8, String::from("b")), (1, String::from("a"))]);
        let text = json(&map);
        assert_eq!(
            text,
            r#"{"value0":[{"key":1,"value":"a"},{"key":2,"value":"b"}]}"#
        );

        let mut copy = BTreeMap::new();
        let mut archive = JsonInputArchive::parse(&text).unwrap();
        copy.load(&mut archive).unwrap();
        assert_eq!(copy, map);
    }

    #[test]
    fn load_replaces_previous_contents() {
        let mut archive = JsonInputArchive::parse(r#"{"value0": [1, 2, 3]}"#).unwrap();
        let mut items = VecDeque::from([9_u32, 9, 9, 9]);
        items.load(&mut archive).unwrap();
        assert_eq!(items, [1, 2, 3]);
    }

    #[test]
    fn array_length_must_match() {
        let mut archive = JsonInputArchive::parse(r#"{"value0": [1, 2, 3]}"#).unwrap();
        let mut items = [0_i16; 2];
        assert!(matches!(
            items.load(&mut archive),
            Err(SerialError::LengthMismatch { expected: 2, found: 3 })
        ));
    }
}
