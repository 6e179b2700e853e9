//! Script fragments embedded at compile time.
//!
//! Embedding keeps the server distributable as a single binary; a
//! resources directory can still override these for development (see
//! [`LibraryResolver::from_dir`](crate::LibraryResolver::from_dir)).

/// The default manifest.
pub const MANIFEST: &str = include_str!("../resources/manifest.json");

/// Geometry helpers: visible bounds, unit conversion.
pub const GEOMETRY: &str = include_str!("../resources/geometry.jsx");

/// Spatial selection ordering.
pub const SELECTION: &str = include_str!("../resources/selection.jsx");

/// Grid placement by visible-bounds deltas.
pub const LAYOUT: &str = include_str!("../resources/layout.jsx");

/// Named slot presets and idempotent fitting.
pub const PRESETS: &str = include_str!("../resources/presets.jsx");

/// Placed/raster asset analysis.
pub const ASSETS: &str = include_str!("../resources/assets.jsx");

/// The panel-side Task Protocol executor.
pub const TASK_EXECUTOR: &str = include_str!("../resources/task_executor.jsx");

/// Gets an embedded fragment by its manifest file name.
#[must_use]
pub fn source_for(file: &str) -> Option<&'static str> {
    match file {
        "geometry.jsx" => Some(GEOMETRY),
        "selection.jsx" => Some(SELECTION),
        "layout.jsx" => Some(LAYOUT),
        "presets.jsx" => Some(PRESETS),
        "assets.jsx" => Some(ASSETS),
        "task_executor.jsx" => Some(TASK_EXECUTOR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_file_has_a_source() {
        let manifest = crate::LibraryManifest::from_json(MANIFEST).unwrap();
        for entry in manifest.libraries.values() {
            assert!(
                source_for(&entry.file).is_some(),
                "missing embedded source for {}",
                entry.file
            );
        }
    }

    #[test]
    fn executor_fragment_defines_its_exports() {
        assert!(TASK_EXECUTOR.contains("function executeTask"));
        assert!(TASK_EXECUTOR.contains("function collectTargets"));
        assert!(TASK_EXECUTOR.contains("function buildItemRef"));
    }

    #[test]
    fn geometry_fragment_defines_conversions() {
        assert!(GEOMETRY.contains("2.83464567"));
        assert!(GEOMETRY.contains("function getVisibleBounds"));
    }
}
