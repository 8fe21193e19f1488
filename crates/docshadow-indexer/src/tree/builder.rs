//! Structure map builder.

use super::ProjectStructure;
use tracing::debug;

/// Builds a [`ProjectStructure`] from discovered source paths.
#[derive(Debug, Default)]
pub struct StructureBuilder;

impl StructureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the map for `/`-separated relative source paths.
    ///
    /// Paths are sorted and deduplicated first, so the result does not depend
    /// on discovery order.
    pub fn build(&self, paths: &[String]) -> ProjectStructure {
        let mut sorted: Vec<&str> = paths.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut structure = ProjectStructure::new();
        for path in &sorted {
            structure.insert(path);
        }

        debug!(
            paths = sorted.len(),
            files = structure.file_count(),
            "Structure map built"
        );

        structure
    }
}
