use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The caller's `Cargo.toml`, used to find how a crate is reachable from the
/// code a derive macro emits.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_serial"));
/// ```
///
/// Reading the manifest is not cheap; call [`Manifest::shared`] once per macro
/// invocation and reuse the path.
///
/// # Resolution rules
///
/// 1. If the requested crate is a dependency, under its own name or renamed
///    through `package = "..."`, return `::dependency_key`.
/// 2. If the requested name begins with `vc_` and the caller depends on the
///    facade crate `vc_autoserial`, return `::vc_autoserial::short_name`
///    (e.g. `vc_serial` -> `::vc_autoserial::serial`).
/// 3. Same as 2 for a dependency renamed to `vc`.
/// 4. Repeat steps 1-3 in `dev-dependencies`.
/// 5. Otherwise, fall back to `::crate_name`.
///
/// ## Note
///
/// Inside the requested crate itself, step 5 applies. The crate root should
/// declare `extern crate self as crate_name;` so the absolute path resolves
/// in unit tests too.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "vc_autoserial";
const SHORT_FACADE_NAME: &str = "vc";
const MEMBER_PREFIX: &str = "vc_";

impl Manifest {
    #[inline(never)]
    fn get_manifest_path() -> PathBuf {
        env::var_os("CARGO_MANIFEST_DIR")
            .map(|path| {
                let mut path = PathBuf::from(path);
                path.push("Cargo.toml");
                assert!(
                    path.exists(),
                    "Cargo manifest does not exist at path {}",
                    path.display(),
                );
                path
            })
            .expect("CARGO_MANIFEST_DIR should be auto-defined by cargo.")
    }

    #[inline(never)]
    fn get_manifest_modified_time(cargo_manifest_path: &Path) -> Result<SystemTime, std::io::Error> {
        std::fs::metadata(cargo_manifest_path).and_then(|metadata| metadata.modified())
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Document<Box<str>> {
        let manifest = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()))
            .into_boxed_str();
        Document::parse(manifest)
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()))
    }

    #[inline]
    fn parse_str<T: syn::parse::Parse>(path: &str) -> T {
        syn::parse_str(path).unwrap()
    }

    /// Returns the key under which package `name` is listed in `deps`.
    fn dependency_key<'a>(deps: &'a Table, name: &str) -> Option<&'a str> {
        deps.iter().find_map(|(key, item)| {
            let package = item
                .as_table_like()
                .and_then(|t| t.get("package"))
                .and_then(Item::as_str)
                .unwrap_or(key);
            (package == name).then_some(key)
        })
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if let Some(key) = Self::dependency_key(deps, name) {
            return Some(Self::parse_str(&format!("::{}", key.replace('-', "_"))));
        }

        let module = name.strip_prefix(MEMBER_PREFIX)?;
        let facade = Self::dependency_key(deps, FACADE_NAME)
            .or_else(|| deps.contains_key(SHORT_FACADE_NAME).then_some(SHORT_FACADE_NAME))?;

        let mut path = Self::parse_str::<syn::Path>(&format!("::{}", facade.replace('-', "_")));
        path.segments.push(Self::parse_str(module));
        Some(path)
    }

    /// Returns a [`syn::Path`] for the package `name` as seen from the caller.
    /// See the type-level documentation for the resolution order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        for section in ["dependencies", "dev-dependencies"] {
            if let Some(Item::Table(deps)) = self.manifest.get(section)
                && let Some(val) = Self::find_in_deps(deps, name)
            {
                return val;
            }
        }

        Self::parse_str(&format!("::{name}"))
    }

    /// Runs `func` with the caller's manifest.
    ///
    /// Manifests are cached per path and re-read when the file changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let manifest_path = Self::get_manifest_path();
        let modified_time = Self::get_manifest_modified_time(&manifest_path)
            .expect("The Cargo.toml should have a modified time.");

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(manifest) = manifests.get(&manifest_path)
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }

        drop(manifests);

        let manifest = Manifest {
            manifest: Self::read_manifest(&manifest_path),
            modified_time,
        };

        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(manifest_path, manifest);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(text: &str) -> Manifest {
        Manifest {
            manifest: Document::parse(text.to_owned().into_boxed_str()).unwrap(),
            modified_time: SystemTime::UNIX_EPOCH,
        }
    }

    fn resolve(text: &str) -> String {
        let path = manifest(text).get_crate_path("vc_serial");
        quote_path(&path)
    }

    fn quote_path(path: &syn::Path) -> String {
        let segments: Vec<_> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        format!("::{}", segments.join("::"))
    }

    #[test]
    fn direct_dependency() {
        assert_eq!(resolve("[dependencies]\nvc_serial = \"0.0.1\"\n"), "::vc_serial");
    }

    #[test]
    fn renamed_dependency() {
        let text = "[dependencies]\nserial = { package = \"vc_serial\", path = \"..\" }\n";
        assert_eq!(resolve(text), "::serial");
    }

    #[test]
    fn through_facade() {
        assert_eq!(
            resolve("[dependencies]\nvc_autoserial = \"0.0.1\"\n"),
            "::vc_autoserial::serial"
        );
        assert_eq!(
            resolve("[dev-dependencies]\nvc = { package = \"vc_autoserial\", path = \"..\" }\n"),
            "::vc::serial"
        );
    }

    #[test]
    fn fallback() {
        assert_eq!(resolve("[package]\nname = \"vc_serial\"\n"), "::vc_serial");
    }
}
