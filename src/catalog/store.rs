use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::catalog::builtin::default_catalog;
use crate::catalog::schema::Catalog;

/// Loads a catalog from a JSON file, or the built-in catalog when `path` is `None`.
///
/// The fingerprint is always recomputed so a hand-edited file cannot carry a stale one.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(default_catalog());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading catalog: {}", path.display()))?;
    let parsed: Catalog = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing catalog JSON: {}", path.display()))?;
    let catalog = Catalog::with_fingerprint(parsed.courses, parsed.institutions);
    debug!(
        courses = catalog.courses.len(),
        institutions = catalog.institutions.len(),
        "loaded catalog from {}",
        path.display()
    );
    Ok(catalog)
}

pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating catalog directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(catalog)?;
    fs::write(path, json).with_context(|| format!("failed writing catalog: {}", path.display()))
}
