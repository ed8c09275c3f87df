//! Dataset-wide KPI summary.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{columns, Record};

/// Scalar summary shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_sold: u64,
    /// Mean price, rounded to 2 decimals.
    pub avg_price: f64,
    /// Mean defect rate, rounded to 2 decimals.
    pub avg_defect_rate: f64,
    pub total_stock: u64,
}

/// Compute the KPI summary over every record.
///
/// Sums run left to right in dataset order. An empty dataset is rejected
/// because both means are undefined over zero rows, and a count total that
/// does not fit in `u64` is rejected as [`AnalyticsError::Overflow`].
pub fn summarize(records: &[Record]) -> AnalyticsResult<KpiSummary> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyDataset {
            stage: "KPI summary",
        });
    }

    let n = records.len() as f64;
    let total_revenue = records.iter().map(|r| r.revenue).sum();
    let total_sold = checked_total(records.iter().map(|r| r.units_sold), columns::UNITS_SOLD)?;
    let total_stock = checked_total(records.iter().map(|r| r.stock_level), columns::STOCK_LEVEL)?;
    let price_sum: f64 = records.iter().map(|r| r.price).sum();
    let defect_sum: f64 = records.iter().map(|r| r.defect_rate).sum();

    Ok(KpiSummary {
        total_revenue,
        total_sold,
        avg_price: round2(price_sum / n),
        avg_defect_rate: round2(defect_sum / n),
        total_stock,
    })
}

/// Sum a count column, failing instead of wrapping.
pub(crate) fn checked_total(
    values: impl IntoIterator<Item = u64>,
    column: &'static str,
) -> AnalyticsResult<u64> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or(AnalyticsError::Overflow { column })
}

/// Round to 2 decimal places, ties to even on the scaled value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
