//! Sales report command.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use tillpoint_register::services::{SalesSummary, orders_on, summarize};

use super::{emit, load_catalog};

#[derive(Serialize)]
struct DailyReport {
    date: NaiveDate,
    #[serde(flatten)]
    summary: SalesSummary,
}

/// Print the sales summary for `date` as YAML.
///
/// # Errors
///
/// Returns an error if the seed cannot be loaded.
pub fn daily(seed: &Path, date: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(Some(seed))?;
    let orders = orders_on(&catalog, date)?;
    let report = DailyReport {
        date,
        summary: summarize(&orders),
    };
    emit(&serde_yaml::to_string(&report)?, None)?;
    Ok(())
}
