//! CLI command implementations.

pub mod export;
pub mod import;
pub mod report;
pub mod voice;

use std::io::Write;
use std::path::Path;

use tillpoint_register::catalog::{CatalogSeed, InMemoryCatalog, seed::SeedError};

/// Build a catalog from an optional YAML seed.
fn load_catalog(seed: Option<&Path>) -> Result<InMemoryCatalog, SeedError> {
    let catalog = InMemoryCatalog::new();
    if let Some(path) = seed {
        tracing::info!(path = %path.display(), "Loading catalog seed");
        CatalogSeed::from_yaml_file(path)?.load_into(&catalog)?;
    }
    Ok(catalog)
}

/// Write `text` to `out`, or to stdout when no path is given.
fn emit(text: &str, out: Option<&Path>) -> std::io::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), "Written");
            Ok(())
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()
        }
    }
}
