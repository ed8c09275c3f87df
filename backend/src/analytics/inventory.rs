//! Per-row inventory efficiency metrics.
//!
//! Both metrics are pure functions of a single record, so rows can be
//! computed in any order.

use serde::{Deserialize, Serialize};

use crate::models::{
    AbcClass, EnrichedRecord, InventoryMetrics, Record, DOI_NO_SALES, SALES_WINDOW_DAYS,
};

/// Days the current stock lasts at the average daily sales rate.
///
/// Returns [`DOI_NO_SALES`] when nothing sold, whatever the stock level.
pub fn days_of_inventory(stock_level: u64, units_sold: u64) -> f64 {
    if units_sold == 0 {
        return DOI_NO_SALES;
    }
    stock_level as f64 / (units_sold as f64 / SALES_WINDOW_DAYS)
}

/// Units sold per unit held in stock.
///
/// With zero stock the raw units sold are reported.
pub fn turnover_rate(stock_level: u64, units_sold: u64) -> f64 {
    if stock_level == 0 {
        return units_sold as f64;
    }
    units_sold as f64 / stock_level as f64
}

/// Both metrics for one record.
pub fn inventory_metrics(record: &Record) -> InventoryMetrics {
    InventoryMetrics {
        days_of_inventory: days_of_inventory(record.stock_level, record.units_sold),
        turnover_rate: turnover_rate(record.stock_level, record.units_sold),
    }
}

/// Attach metrics to classified records.
pub fn enrich(classified: Vec<(&Record, AbcClass)>) -> Vec<EnrichedRecord> {
    classified
        .into_iter()
        .map(|(record, abc_class)| EnrichedRecord {
            metrics: inventory_metrics(record),
            record: record.clone(),
            abc_class,
        })
        .collect()
}

/// One row of the dashboard's inventory table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    #[serde(rename = "Product type")]
    pub product_type: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Stock levels")]
    pub stock_level: u64,
    #[serde(rename = "Number of products sold")]
    pub units_sold: u64,
    #[serde(rename = "DOI")]
    pub days_of_inventory: f64,
    #[serde(rename = "Turnover_Rate")]
    pub turnover_rate: f64,
    #[serde(rename = "ABC_Class")]
    pub abc_class: AbcClass,
    #[serde(rename = "Revenue generated")]
    pub revenue: f64,
}

impl From<&EnrichedRecord> for InventoryRow {
    fn from(e: &EnrichedRecord) -> Self {
        Self {
            product_type: e.record.product_type.clone(),
            sku: e.record.sku.clone(),
            stock_level: e.record.stock_level,
            units_sold: e.record.units_sold,
            days_of_inventory: e.metrics.days_of_inventory,
            turnover_rate: e.metrics.turnover_rate,
            abc_class: e.abc_class,
            revenue: e.record.revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doi_uses_thirty_day_window() {
        // 60 sold in 30 days = 2/day; 10 in stock lasts 5 days
        assert_eq!(days_of_inventory(10, 60), 5.0);
        assert_eq!(days_of_inventory(0, 60), 0.0);
    }

    #[test]
    fn test_doi_sentinel_when_nothing_sold() {
        assert_eq!(days_of_inventory(0, 0), 999.0);
        assert_eq!(days_of_inventory(42, 0), 999.0);
    }

    #[test]
    fn test_turnover() {
        assert_eq!(turnover_rate(4, 10), 2.5);
        assert_eq!(turnover_rate(7, 0), 0.0);
    }

    #[test]
    fn test_zero_stock_reports_units_sold() {
        let record = Record {
            stock_level: 0,
            units_sold: 20,
            ..Default::default()
        };
        let metrics = inventory_metrics(&record);

        assert_eq!(metrics.turnover_rate, 20.0);
        assert_eq!(metrics.days_of_inventory, 0.0);
    }

    #[test]
    fn test_inventory_row_keys() {
        let record = Record {
            sku: "SKU9".into(),
            product_type: "cosmetics".into(),
            stock_level: 30,
            units_sold: 90,
            revenue: 123.5,
            ..Default::default()
        };
        let enriched = enrich(vec![(&record, AbcClass::B)]);
        let row = InventoryRow::from(&enriched[0]);
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["SKU"], "SKU9");
        assert_eq!(json["Product type"], "cosmetics");
        assert_eq!(json["Stock levels"], 30);
        assert_eq!(json["Number of products sold"], 90);
        assert_eq!(json["DOI"], 10.0);
        assert_eq!(json["Turnover_Rate"], 3.0);
        assert_eq!(json["ABC_Class"], "B");
        assert_eq!(json["Revenue generated"], 123.5);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }
}
