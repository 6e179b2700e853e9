//! Transitive library resolution with collision detection.

use crate::embedded;
use crate::manifest::LibraryManifest;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors from library resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Requested or referenced library is not in the manifest.
    #[error("unknown library: {0}")]
    UnknownLibrary(String),

    /// Manifest names a fragment file that has no source.
    #[error("library file not found: {file} (library '{library}')")]
    MissingSource { library: String, file: String },

    /// Dependency cycle; resolution fails fast naming the edge that
    /// closed the cycle.
    #[error("dependency cycle between '{from}' and '{to}'")]
    Cycle { from: String, to: String },

    /// Two selected libraries declare the same symbol.
    #[error("symbol collision: '{symbol}' defined in both '{first}' and '{second}'")]
    SymbolCollision {
        symbol: String,
        first: String,
        second: String,
    },

    /// Manifest could not be read or parsed.
    #[error("invalid manifest: {0}")]
    Manifest(String),
}

#[derive(Debug)]
enum SourceSet {
    Embedded,
    Loaded(HashMap<String, String>),
}

/// Resolves library request sets into concatenated script text.
///
/// Thread-safe: resolutions may proceed concurrently, and successful
/// concatenations are cached keyed by the sorted request set.
#[derive(Debug)]
pub struct LibraryResolver {
    manifest: LibraryManifest,
    sources: SourceSet,
    cache: Mutex<HashMap<Vec<String>, Arc<str>>>,
}

impl LibraryResolver {
    /// Resolver over the compile-time embedded fragment set.
    #[must_use]
    pub fn embedded() -> Self {
        let manifest = LibraryManifest::from_json(embedded::MANIFEST)
            .expect("embedded manifest is valid by construction");
        Self {
            manifest,
            sources: SourceSet::Embedded,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolver over a directory holding `manifest.json` and fragments.
    ///
    /// # Errors
    ///
    /// Fails when the manifest is unreadable or any referenced fragment
    /// file is missing.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let dir = dir.as_ref();
        let manifest_text = std::fs::read_to_string(dir.join("manifest.json"))
            .map_err(|e| ResolveError::Manifest(e.to_string()))?;
        let manifest = LibraryManifest::from_json(&manifest_text)
            .map_err(|e| ResolveError::Manifest(e.to_string()))?;

        let mut sources = HashMap::new();
        for (name, entry) in &manifest.libraries {
            let text = std::fs::read_to_string(dir.join(&entry.file)).map_err(|_| {
                ResolveError::MissingSource {
                    library: name.clone(),
                    file: entry.file.clone(),
                }
            })?;
            sources.insert(entry.file.clone(), text);
        }

        tracing::debug!(dir = %dir.display(), libraries = manifest.libraries.len(), "loaded script library directory");
        Ok(Self {
            manifest,
            sources: SourceSet::Loaded(sources),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Known library names.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.manifest.names()
    }

    /// Resolves the transitive closure of `includes` in dependency
    /// order, each library exactly once.
    ///
    /// # Errors
    ///
    /// Fails on unknown libraries, dependency cycles, missing fragment
    /// sources, and exported-symbol collisions.
    pub fn resolve(&self, includes: &[String]) -> Result<Arc<str>, ResolveError> {
        if includes.is_empty() {
            return Ok(Arc::from(""));
        }

        let mut key: Vec<String> = includes.to_vec();
        key.sort();
        key.dedup();
        if let Some(cached) = self.cache.lock().get(&key) {
            return Ok(Arc::clone(cached));
        }

        let mut resolved: Vec<&str> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        let mut visiting: Vec<String> = Vec::new();
        let mut exports: BTreeMap<String, String> = BTreeMap::new();

        for name in includes {
            self.resolve_one(name, &mut resolved, &mut seen, &mut visiting, &mut exports)?;
        }

        let text: Arc<str> = Arc::from(resolved.join("\n\n"));
        self.cache.lock().insert(key, Arc::clone(&text));
        Ok(text)
    }

    /// Composes a shippable script: resolved libraries, a separator,
    /// then the user body.
    ///
    /// # Errors
    ///
    /// Propagates any [`ResolveError`] from [`resolve`](Self::resolve).
    pub fn compose(&self, script: &str, includes: &[String]) -> Result<String, ResolveError> {
        if includes.is_empty() {
            return Ok(script.to_string());
        }
        let libraries = self.resolve(includes)?;
        Ok(format!("{libraries}\n\n// === User Script ===\n{script}"))
    }

    fn resolve_one<'a>(
        &'a self,
        name: &str,
        resolved: &mut Vec<&'a str>,
        seen: &mut Vec<String>,
        visiting: &mut Vec<String>,
        exports: &mut BTreeMap<String, String>,
    ) -> Result<(), ResolveError> {
        if seen.iter().any(|s| s == name) {
            return Ok(());
        }
        if visiting.iter().any(|s| s == name) {
            return Err(ResolveError::Cycle {
                from: visiting.last().cloned().unwrap_or_default(),
                to: name.to_string(),
            });
        }

        let entry = self
            .manifest
            .get(name)
            .ok_or_else(|| ResolveError::UnknownLibrary(name.to_string()))?;

        visiting.push(name.to_string());
        for dep in &entry.dependencies {
            self.resolve_one(dep, resolved, seen, visiting, exports)?;
        }
        visiting.pop();

        for symbol in &entry.exports {
            if let Some(first) = exports.get(symbol) {
                return Err(ResolveError::SymbolCollision {
                    symbol: symbol.clone(),
                    first: first.clone(),
                    second: name.to_string(),
                });
            }
            exports.insert(symbol.clone(), name.to_string());
        }

        let source = match &self.sources {
            SourceSet::Embedded => embedded::source_for(&entry.file),
            SourceSet::Loaded(map) => map.get(&entry.file).map(String::as_str),
        }
        .ok_or_else(|| ResolveError::MissingSource {
            library: name.to_string(),
            file: entry.file.clone(),
        })?;

        resolved.push(source);
        seen.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn resolves_transitive_dependencies_in_order() {
        let resolver = LibraryResolver::embedded();
        let text = resolver.resolve(&names(&["presets"])).unwrap();
        // geometry (presets' transitive dep via layout) precedes layout,
        // which precedes presets.
        let geometry = text.find("function getVisibleBounds").unwrap();
        let layout = text.find("function arrangeGrid").unwrap();
        let presets = text.find("function computeSlotGeometry").unwrap();
        assert!(geometry < layout && layout < presets);
    }

    #[test]
    fn shared_dependency_included_exactly_once() {
        let resolver = LibraryResolver::embedded();
        let text = resolver
            .resolve(&names(&["layout", "assets", "task_executor"]))
            .unwrap();
        assert_eq!(text.matches("function getVisibleBounds").count(), 1);
    }

    #[test]
    fn unknown_library_is_an_error() {
        let resolver = LibraryResolver::embedded();
        let err = resolver.resolve(&names(&["nonexistent"])).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownLibrary(name) if name == "nonexistent"));
    }

    #[test]
    fn cache_returns_the_same_allocation() {
        let resolver = LibraryResolver::embedded();
        let a = resolver.resolve(&names(&["geometry", "layout"])).unwrap();
        // Request order must not defeat the cache.
        let b = resolver.resolve(&names(&["layout", "geometry"])).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn compose_appends_user_body_after_separator() {
        let resolver = LibraryResolver::embedded();
        let script = resolver
            .compose("var x = mmToPoints(10);", &names(&["geometry"]))
            .unwrap();
        let sep = script.find("// === User Script ===").unwrap();
        assert!(script.find("function mmToPoints").unwrap() < sep);
        assert!(script.find("var x = mmToPoints(10);").unwrap() > sep);
    }

    #[test]
    fn compose_without_includes_passes_through() {
        let resolver = LibraryResolver::embedded();
        let script = resolver.compose("var y = 1;", &[]).unwrap();
        assert_eq!(script, "var y = 1;");
    }

    #[test]
    fn concurrent_resolutions_agree() {
        let resolver = std::sync::Arc::new(LibraryResolver::embedded());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = std::sync::Arc::clone(&resolver);
                std::thread::spawn(move || {
                    resolver
                        .resolve(&["task_executor".to_string()])
                        .unwrap()
                        .len()
                })
            })
            .collect();
        let lengths: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(lengths.windows(2).all(|w| w[0] == w[1]));
    }

    fn write_dir_fixture(dir: &std::path::Path, manifest: &str, files: &[(&str, &str)]) {
        std::fs::write(dir.join("manifest.json"), manifest).unwrap();
        for (name, body) in files {
            std::fs::write(dir.join(name), body).unwrap();
        }
    }

    #[test]
    fn cycle_is_detected_and_names_the_edge() {
        let dir = tempfile::tempdir().unwrap();
        write_dir_fixture(
            dir.path(),
            r#"{"libraries": {
                "a": {"file": "a.jsx", "dependencies": ["b"], "exports": ["fa"]},
                "b": {"file": "b.jsx", "dependencies": ["a"], "exports": ["fb"]}
            }}"#,
            &[("a.jsx", "function fa() {}"), ("b.jsx", "function fb() {}")],
        );
        let resolver = LibraryResolver::from_dir(dir.path()).unwrap();
        let err = resolver.resolve(&["a".to_string()]).unwrap_err();
        match err {
            ResolveError::Cycle { from, to } => {
                assert_eq!((from.as_str(), to.as_str()), ("b", "a"));
            }
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn symbol_collision_names_both_libraries() {
        let dir = tempfile::tempdir().unwrap();
        write_dir_fixture(
            dir.path(),
            r#"{"libraries": {
                "first": {"file": "first.jsx", "exports": ["shared"]},
                "second": {"file": "second.jsx", "exports": ["shared"]}
            }}"#,
            &[
                ("first.jsx", "function shared() {}"),
                ("second.jsx", "function shared() {}"),
            ],
        );
        let resolver = LibraryResolver::from_dir(dir.path()).unwrap();
        let err = resolver
            .resolve(&["first".to_string(), "second".to_string()])
            .unwrap_err();
        match err {
            ResolveError::SymbolCollision {
                symbol,
                first,
                second,
            } => {
                assert_eq!(symbol, "shared");
                assert_eq!(first, "first");
                assert_eq!(second, "second");
            }
            other => panic!("expected collision, got {other}"),
        }
    }

    #[test]
    fn from_dir_rejects_missing_fragment_files() {
        let dir = tempfile::tempdir().unwrap();
        write_dir_fixture(
            dir.path(),
            r#"{"libraries": {"ghost": {"file": "ghost.jsx"}}}"#,
            &[],
        );
        let err = LibraryResolver::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ResolveError::MissingSource { .. }));
    }
}
