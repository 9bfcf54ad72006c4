//! Bulk CSV import commands.
//!
//! The import report is printed as YAML; with `--out` the resulting catalog is
//! written back as a seed file.

use std::fs::File;
use std::path::Path;

use tillpoint_register::catalog::{CatalogSeed, InMemoryCatalog};
use tillpoint_register::import::{ImportReport, import_customers, import_products};

use super::{emit, load_catalog};

/// Import products from `csv`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, or the CSV header is
/// unreadable. Invalid rows are listed in the report instead.
pub fn products(
    csv: &Path,
    seed: Option<&Path>,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(seed)?;
    let report = import_products(&catalog, File::open(csv)?)?;
    finish(&catalog, &report, out)
}

/// Import customers from `csv`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, or the CSV header is
/// unreadable. Invalid rows are listed in the report instead.
pub fn customers(
    csv: &Path,
    seed: Option<&Path>,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(seed)?;
    let report = import_customers(&catalog, File::open(csv)?)?;
    finish(&catalog, &report, out)
}

fn finish(
    catalog: &InMemoryCatalog,
    report: &ImportReport,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = out {
        let snapshot = CatalogSeed::snapshot(catalog)?;
        emit(&snapshot.to_yaml()?, Some(path))?;
    }
    if !report.errors.is_empty() {
        tracing::warn!(skipped = report.errors.len(), "Some rows were skipped");
    }
    emit(&serde_yaml::to_string(report)?, None)?;
    Ok(())
}
