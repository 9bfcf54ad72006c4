//! HTML documents rendered from askama templates.

use askama::Template;
use chrono::Utc;
use tracing::{debug, instrument};

use tillpoint_core::Money;

use super::{Document, DocumentError, DocumentKind, DocumentRequest, DocumentSink};
use crate::models::{CartItem, Order, Product};
use crate::services::reports;

const HTML: &str = "text/html; charset=utf-8";

/// Receipt line view.
#[derive(Debug, Clone)]
pub struct LineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub total: String,
}

impl From<&CartItem> for LineView {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.product.name.clone(),
            quantity: item.quantity,
            price: Money::new(item.product.price).to_string(),
            total: Money::new(item.line_total()).to_string(),
        }
    }
}

/// Receipt template.
#[derive(Template)]
#[template(path = "receipt.html")]
pub struct ReceiptTemplate {
    pub store_name: String,
    pub order_id: String,
    pub date: String,
    pub customer: Option<String>,
    pub payment_method: String,
    pub lines: Vec<LineView>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub notes: Option<String>,
}

/// Order row in the daily report.
#[derive(Debug, Clone)]
pub struct ReportOrderView {
    pub id: String,
    pub time: String,
    pub customer: String,
    pub payment_method: String,
    pub status: String,
    pub total: String,
}

/// Payment method row in the daily report.
#[derive(Debug, Clone)]
pub struct ReportMethodView {
    pub method: String,
    pub orders: usize,
    pub total: String,
}

/// Daily sales report template.
#[derive(Template)]
#[template(path = "daily_sales.html")]
pub struct DailySalesTemplate {
    pub store_name: String,
    pub date: String,
    pub completed_orders: usize,
    pub items_sold: u64,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub methods: Vec<ReportMethodView>,
    pub orders: Vec<ReportOrderView>,
    pub printed_at: String,
}

/// Catalog row view.
#[derive(Debug, Clone)]
pub struct CatalogRowView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub in_stock: u32,
    pub barcode: String,
}

/// Catalog sheet template.
#[derive(Template)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub store_name: String,
    pub products: Vec<CatalogRowView>,
    pub printed_at: String,
}

/// Renders documents as standalone printable HTML pages.
#[derive(Debug, Clone)]
pub struct HtmlDocumentSink {
    store_name: String,
}

impl HtmlDocumentSink {
    #[must_use]
    pub fn new(store_name: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
        }
    }

    fn receipt(&self, order: &Order) -> ReceiptTemplate {
        ReceiptTemplate {
            store_name: self.store_name.clone(),
            order_id: order.id.to_string(),
            date: order.date.format("%Y-%m-%d %H:%M UTC").to_string(),
            customer: order.customer_name.clone(),
            payment_method: order.payment_method.to_string(),
            lines: order.items.iter().map(LineView::from).collect(),
            subtotal: Money::new(order.subtotal).to_string(),
            tax: Money::new(order.tax.unwrap_or_default()).to_string(),
            total: Money::new(order.total).to_string(),
            notes: order.notes.clone(),
        }
    }

    fn daily_sales(&self, date: chrono::NaiveDate, orders: &[Order]) -> DailySalesTemplate {
        let summary = reports::summarize(orders);
        DailySalesTemplate {
            store_name: self.store_name.clone(),
            date: date.format("%Y-%m-%d").to_string(),
            completed_orders: summary.completed_orders,
            items_sold: summary.items_sold,
            subtotal: Money::new(summary.subtotal).to_string(),
            tax: Money::new(summary.tax).to_string(),
            total: Money::new(summary.total).to_string(),
            methods: summary
                .by_method
                .iter()
                .map(|m| ReportMethodView {
                    method: m.method.to_string(),
                    orders: m.orders,
                    total: Money::new(m.total).to_string(),
                })
                .collect(),
            orders: orders
                .iter()
                .map(|o| ReportOrderView {
                    id: o.id.to_string(),
                    time: o.date.format("%H:%M").to_string(),
                    customer: o
                        .customer_name
                        .clone()
                        .unwrap_or_else(|| "Guest".to_string()),
                    payment_method: o.payment_method.to_string(),
                    status: o.status.to_string(),
                    total: Money::new(o.total).to_string(),
                })
                .collect(),
            printed_at: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }

    fn catalog(&self, products: &[Product]) -> CatalogTemplate {
        CatalogTemplate {
            store_name: self.store_name.clone(),
            products: products
                .iter()
                .map(|p| CatalogRowView {
                    id: p.id.to_string(),
                    name: p.name.clone(),
                    category: p.category.clone(),
                    price: Money::new(p.price).to_string(),
                    in_stock: p.in_stock,
                    barcode: p.barcode.clone().unwrap_or_default(),
                })
                .collect(),
            printed_at: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

impl Default for HtmlDocumentSink {
    fn default() -> Self {
        Self::new("Tillpoint")
    }
}

fn render_error(kind: DocumentKind) -> impl FnOnce(askama::Error) -> DocumentError {
    move |e| DocumentError::Render {
        kind,
        message: e.to_string(),
    }
}

impl DocumentSink for HtmlDocumentSink {
    #[instrument(skip(self, request), fields(kind = %request.kind()))]
    fn render(&self, request: DocumentRequest<'_>) -> Result<Document, DocumentError> {
        let kind = request.kind();
        let (filename, body) = match request {
            DocumentRequest::Receipt(order) => (
                format!("receipt-{}.html", order.id),
                self.receipt(order).render().map_err(render_error(kind))?,
            ),
            DocumentRequest::DailySalesReport { date, orders } => (
                format!("daily-sales-{}.html", date.format("%Y-%m-%d")),
                self.daily_sales(date, orders)
                    .render()
                    .map_err(render_error(kind))?,
            ),
            DocumentRequest::Catalog(products) => (
                "catalog.html".to_string(),
                self.catalog(products).render().map_err(render_error(kind))?,
            ),
        };
        debug!(%filename, bytes = body.len(), "Document rendered");

        Ok(Document {
            kind,
            filename,
            content_type: HTML,
            body,
        })
    }
}
