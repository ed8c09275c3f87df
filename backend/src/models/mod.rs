//! Domain models for the supply-chain analytics pipeline.
//!
//! - [`Record`] - One row of the source table
//! - [`AbcClass`] - Pareto tier derived from cumulative sales share
//! - [`InventoryMetrics`] - Per-row days-of-inventory and turnover
//! - [`EnrichedRecord`] - A record with every derived field attached
//! - [`Dataset`] - Records in source order

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

// =============================================================================
// Source Column Names
// =============================================================================

/// Exact column names of the source table and of the output payload.
pub mod columns {
    pub const SKU: &str = "SKU";
    pub const PRODUCT_TYPE: &str = "Product type";
    pub const REVENUE: &str = "Revenue generated";
    pub const UNITS_SOLD: &str = "Number of products sold";
    pub const PRICE: &str = "Price";
    pub const DEFECT_RATE: &str = "Defect rates";
    pub const STOCK_LEVEL: &str = "Stock levels";
    pub const SHIPPING_CARRIER: &str = "Shipping carriers";
    pub const TRANSPORTATION_MODE: &str = "Transportation modes";
    pub const SHIPPING_COST: &str = "Shipping costs";
    pub const LOCATION: &str = "Location";

    pub const ABC_CLASS: &str = "ABC_Class";
    pub const DOI: &str = "DOI";
    pub const TURNOVER_RATE: &str = "Turnover_Rate";

    /// Every column the loader requires.
    pub const REQUIRED: [&str; 11] = [
        SKU,
        PRODUCT_TYPE,
        REVENUE,
        UNITS_SOLD,
        PRICE,
        DEFECT_RATE,
        STOCK_LEVEL,
        SHIPPING_CARRIER,
        TRANSPORTATION_MODE,
        SHIPPING_COST,
        LOCATION,
    ];
}

// =============================================================================
// Record
// =============================================================================

/// One row of the source table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Not guaranteed unique across the dataset.
    pub sku: String,
    pub product_type: String,
    pub location: String,
    pub shipping_carrier: String,
    pub transportation_mode: String,
    pub revenue: f64,
    pub units_sold: u64,
    pub price: f64,
    /// Expected in [0, 1], passed through unchecked.
    pub defect_rate: f64,
    pub stock_level: u64,
    pub shipping_cost: f64,
    /// Columns outside the required schema, in source order.
    pub extra: Vec<(String, String)>,
    /// Header row of the source, shared by every record of one load.
    /// `None` for records built in memory.
    pub column_order: Option<Arc<[String]>>,
}

/// Key order used when a record carries no header row.
const DEFAULT_ORDER: [&str; 11] = [
    columns::PRODUCT_TYPE,
    columns::SKU,
    columns::PRICE,
    columns::UNITS_SOLD,
    columns::REVENUE,
    columns::STOCK_LEVEL,
    columns::SHIPPING_CARRIER,
    columns::LOCATION,
    columns::DEFECT_RATE,
    columns::TRANSPORTATION_MODE,
    columns::SHIPPING_COST,
];

impl Record {
    /// Emit every column, following the source header when there is one.
    fn serialize_fields<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        let Some(order) = &self.column_order else {
            for column in DEFAULT_ORDER {
                self.serialize_column(column, map)?;
            }
            for (name, raw) in &self.extra {
                map.serialize_entry(name, &cell_value(raw))?;
            }
            return Ok(());
        };

        let mut extra = self.extra.iter();
        let mut written = [false; columns::REQUIRED.len()];
        for header in order.iter() {
            match columns::REQUIRED.iter().position(|c| *c == header.as_str()) {
                // Repeated required headers are read from their first occurrence
                Some(i) if written[i] => {}
                Some(i) => {
                    written[i] = true;
                    self.serialize_column(columns::REQUIRED[i], map)?;
                }
                None => {
                    if let Some((name, raw)) = extra.next() {
                        map.serialize_entry(name, &cell_value(raw))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn serialize_column<M: SerializeMap>(&self, column: &str, map: &mut M) -> Result<(), M::Error> {
        match column {
            columns::SKU => map.serialize_entry(column, &self.sku),
            columns::PRODUCT_TYPE => map.serialize_entry(column, &self.product_type),
            columns::REVENUE => map.serialize_entry(column, &self.revenue),
            columns::UNITS_SOLD => map.serialize_entry(column, &self.units_sold),
            columns::PRICE => map.serialize_entry(column, &self.price),
            columns::DEFECT_RATE => map.serialize_entry(column, &self.defect_rate),
            columns::STOCK_LEVEL => map.serialize_entry(column, &self.stock_level),
            columns::SHIPPING_CARRIER => map.serialize_entry(column, &self.shipping_carrier),
            columns::TRANSPORTATION_MODE => map.serialize_entry(column, &self.transportation_mode),
            columns::SHIPPING_COST => map.serialize_entry(column, &self.shipping_cost),
            columns::LOCATION => map.serialize_entry(column, &self.location),
            _ => Ok(()),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_fields(&mut map)?;
        map.end()
    }
}

/// JSON value for a pass-through cell: numbers stay numbers, blanks are null.
pub fn cell_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::from(f),
        _ => Value::from(trimmed),
    }
}

/// Records in source order. Order decides ABC tie-breaks.
pub type Dataset = Vec<Record>;

// =============================================================================
// ABC Class
// =============================================================================

/// Share thresholds (inclusive upper bounds) for tiers A and B.
pub const CLASS_A_MAX_SHARE: f64 = 0.80;
pub const CLASS_B_MAX_SHARE: f64 = 0.95;

/// Pareto tier of a record by cumulative share of units sold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    /// Tier for a cumulative share in [0, 1].
    pub fn from_share(share: f64) -> Self {
        if share <= CLASS_A_MAX_SHARE {
            AbcClass::A
        } else if share <= CLASS_B_MAX_SHARE {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        }
    }
}

impl std::fmt::Display for AbcClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Derived Fields
// =============================================================================

/// Days of inventory reported when nothing sells.
pub const DOI_NO_SALES: f64 = 999.0;

/// Days in the sales window `units_sold` covers.
pub const SALES_WINDOW_DAYS: f64 = 30.0;

/// Per-row inventory efficiency metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventoryMetrics {
    pub days_of_inventory: f64,
    pub turnover_rate: f64,
}

/// A record with its ABC class and inventory metrics attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: Record,
    pub abc_class: AbcClass,
    pub metrics: InventoryMetrics,
}

impl Serialize for EnrichedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.record.serialize_fields(&mut map)?;
        map.serialize_entry(columns::ABC_CLASS, &self.abc_class)?;
        map.serialize_entry(columns::DOI, &self.metrics.days_of_inventory)?;
        map.serialize_entry(columns::TURNOVER_RATE, &self.metrics.turnover_rate)?;
        map.end()
    }
}
