use core::any::TypeId;

use crate::info::{Described, TypeMetadata};
use crate::utils::{FixedHashState, HashMap, HashSet, TypeIdMap};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of [serializable] types.
///
/// Registering a type stores its `'static` [`TypeMetadata`] and indexes it by
/// [`TypeId`], by full type path and by bare identifier. Bases are
/// registered along with the type.
///
/// Two types sharing a bare identifier make that identifier ambiguous: it is
/// removed from the identifier index, the path index still resolves both.
///
/// # Example
///
/// ```
/// use vc_serial::{derive::Serial, registry::TypeRegistry};
///
/// #[derive(Serial)]
/// struct Parent {
///     foo: String,
/// }
///
/// #[derive(Serial)]
/// struct Child {
///     #[serial(base)]
///     parent: Parent,
///     bar: String,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Child>();
///
/// let parent = registry.get_with_type_ident("Parent").unwrap();
/// assert_eq!(parent.field_names(), &["foo"]);
/// assert_eq!(registry.len(), 2);
/// ```
///
/// [serializable]: crate::Described
pub struct TypeRegistry {
    metadata_table: TypeIdMap<&'static TypeMetadata>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_ident_to_id: HashMap<&'static str, TypeId>,
    ambiguous_idents: HashSet<&'static str>,
    auto_registered: bool,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            metadata_table: TypeIdMap::new(),
            type_path_to_id: HashMap::with_hasher(FixedHashState),
            type_ident_to_id: HashMap::with_hasher(FixedHashState),
            ambiguous_idents: HashSet::with_hasher(FixedHashState),
            auto_registered: false,
        }
    }

    // # Validity
    // The type must **not** already exist.
    fn add_new_type_indices(&mut self, meta: &'static TypeMetadata) {
        let ident = meta.type_ident();

        if !self.ambiguous_idents.contains(ident) {
            if self.type_ident_to_id.contains_key(ident) {
                self.type_ident_to_id.remove(ident);
                self.ambiguous_idents.insert(ident);
            } else {
                self.type_ident_to_id.insert(ident, meta.type_id());
            }
        }

        self.type_path_to_id.insert(meta.type_path(), meta.type_id());
    }

    /// Registers `meta` and, recursively, the metadata of its bases.
    ///
    /// Returns `false` if the type was already registered, in which case its
    /// bases are not visited again.
    pub fn register_metadata(&mut self, meta: &'static TypeMetadata) -> bool {
        if !self.metadata_table.try_insert(meta.type_id(), || meta) {
            return false;
        }
        self.add_new_type_indices(meta);
        log::debug!("registered serializable type `{}`", meta.type_path());

        for base in meta.bases() {
            self.register_metadata(base.metadata());
        }
        true
    }

    /// Registers `T` and its bases if `T` is not registered yet.
    ///
    /// Returns `false` if `T` was already registered.
    #[inline]
    pub fn register<T: Described>(&mut self) -> bool {
        self.register_metadata(T::metadata())
    }

    /// Registers the type of `value`.
    #[inline]
    pub fn register_by_val<T: Described>(&mut self, _: &T) -> bool {
        self.register::<T>()
    }

    /// Registers every non-generic type annotated with `#[serial(auto_register)]`.
    ///
    /// Repeated calls are cheap. Returns `true` if static registration is
    /// supported on the current platform (through the `inventory` crate).
    ///
    /// Without the `auto_register` feature this does nothing and returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_serial::{derive::Serial, registry::TypeRegistry};
    ///
    /// #[derive(Serial)]
    /// #[serial(auto_register)]
    /// struct Settings {
    ///     volume: u8,
    /// }
    ///
    /// let mut registry = TypeRegistry::new();
    /// if registry.auto_register() {
    ///     assert!(registry.contains(core::any::TypeId::of::<Settings>()));
    /// }
    /// ```
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if !self.auto_registered {
                self.auto_registered = crate::__macro_exports::auto_register::__register_types(self);
            }
        }
        self.auto_registered
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.metadata_table.contains(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&'static TypeMetadata> {
        self.metadata_table.get(&type_id).copied()
    }

    /// Looks a type up by its full path, as given by [`core::any::type_name`].
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&'static TypeMetadata> {
        self.get(*self.type_path_to_id.get(type_path)?)
    }

    /// Looks a type up by its bare identifier. Ambiguous identifiers return `None`.
    pub fn get_with_type_ident(&self, type_ident: &str) -> Option<&'static TypeMetadata> {
        self.get(*self.type_ident_to_id.get(type_ident)?)
    }

    /// Whether several registered types share `type_ident`.
    #[inline]
    pub fn is_ambiguous(&self, type_ident: &str) -> bool {
        self.ambiguous_idents.contains(type_ident)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.metadata_table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metadata_table.is_empty()
    }

    /// All registered metadata, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &'static TypeMetadata> + '_ {
        self.metadata_table.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::TypeRegistry;
    use crate::derive::Serial;

    mod first {
        #[derive(crate::derive::Serial)]
        pub struct Twin {
            pub a: u8,
        }
    }

    mod second {
        #[derive(crate::derive::Serial)]
        pub struct Twin {
            pub b: u8,
        }
    }

    #[derive(Serial)]
    struct Parent {
        foo: u8,
    }

    #[derive(Serial)]
    #[serial(auto_register)]
    struct Child {
        #[serial(base)]
        parent: Parent,
        bar: u8,
    }

    #[test]
    fn bases_are_registered_once() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register::<Child>());
        assert!(!registry.register::<Child>());
        assert!(!registry.register::<Parent>());
        assert!(registry.contains(TypeId::of::<Parent>()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn ambiguous_idents_resolve_by_path() {
        let mut registry = TypeRegistry::new();
        registry.register::<first::Twin>();
        registry.register::<second::Twin>();

        assert!(registry.is_ambiguous("Twin"));
        assert!(registry.get_with_type_ident("Twin").is_none());

        let path = core::any::type_name::<second::Twin>();
        let meta = registry.get_with_type_path(path).unwrap();
        assert_eq!(meta.field_names(), &["b"]);
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn auto_register_collects_annotated_types() {
        let mut registry = TypeRegistry::new();
        if registry.auto_register() {
            assert!(registry.contains(TypeId::of::<Child>()));
            assert!(registry.contains(TypeId::of::<Parent>()));
            assert!(registry.auto_register());
        }
    }
}
