//! Printable documents: receipts, daily sales reports and catalog sheets.
//!
//! Rendering goes through a [`DocumentSink`] so checkout does not care
//! whether a receipt ends up as HTML, a PDF or paper.

mod html;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Order, Product};

pub use html::HtmlDocumentSink;

/// Errors that can occur while rendering a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The template failed to render.
    #[error("failed to render {kind}: {message}")]
    Render { kind: DocumentKind, message: String },

    /// The document cannot be produced from this input.
    #[error("cannot produce {kind}: {message}")]
    Unsupported { kind: DocumentKind, message: String },
}

/// The kind of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Receipt,
    DailySalesReport,
    Catalog,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Receipt => write!(f, "receipt"),
            Self::DailySalesReport => write!(f, "daily sales report"),
            Self::Catalog => write!(f, "catalog"),
        }
    }
}

/// What to render.
#[derive(Debug, Clone, Copy)]
pub enum DocumentRequest<'a> {
    Receipt(&'a Order),
    DailySalesReport {
        date: NaiveDate,
        orders: &'a [Order],
    },
    Catalog(&'a [Product]),
}

impl DocumentRequest<'_> {
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        match self {
            Self::Receipt(_) => DocumentKind::Receipt,
            Self::DailySalesReport { .. } => DocumentKind::DailySalesReport,
            Self::Catalog(_) => DocumentKind::Catalog,
        }
    }
}

/// A rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub kind: DocumentKind,
    /// Suggested file name, e.g. `receipt-42.html`.
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Renders documents.
pub trait DocumentSink: Send + Sync {
    /// Render `request`.
    ///
    /// # Errors
    ///
    /// Returns an error with a human-readable message if rendering fails.
    fn render(&self, request: DocumentRequest<'_>) -> Result<Document, DocumentError>;
}
