//! Catalog export command.

use std::path::Path;

use tillpoint_register::catalog::CatalogStore;
use tillpoint_register::documents::{DocumentRequest, DocumentSink, HtmlDocumentSink};
use tillpoint_register::import::export_products;

use super::{emit, load_catalog};

/// Output format of a catalog export.
#[derive(Debug, Clone, Copy)]
pub enum Format {
    Csv,
    Html,
}

/// Export the products of `seed`.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded or the output written.
pub fn catalog(
    seed: &Path,
    format: Format,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(Some(seed))?;
    let products = catalog.list_products()?;

    let text = match format {
        Format::Csv => {
            let mut buf = Vec::new();
            export_products(&products, &mut buf)?;
            String::from_utf8(buf)?
        }
        Format::Html => {
            HtmlDocumentSink::default()
                .render(DocumentRequest::Catalog(&products))?
                .body
        }
    };
    emit(&text, out)?;
    tracing::info!(products = products.len(), "Catalog exported");
    Ok(())
}
