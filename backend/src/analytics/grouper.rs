//! Group-by rollups for the dashboard charts.
//!
//! ```text
//! rows                                   rollup rows (ascending key)
//! ┌──────────────────────────────┐      ┌───────────────────────────┐
//! │ Carrier A, Air,  cost 2.0    │      │ Carrier A, Air,  mean 3.0 │
//! │ Carrier A, Air,  cost 4.0    │  →   ├───────────────────────────┤
//! │ Carrier B, Road, cost 9.0    │      │ Carrier B, Road, mean 9.0 │
//! └──────────────────────────────┘      └───────────────────────────┘
//! ```
//!
//! Groups are kept in a `BTreeMap`, so output rows come out sorted by key and
//! identical inputs produce identical payloads. Within a group, values are
//! accumulated in row order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{columns, Record};

/// Mean shipping cost per (carrier, transportation mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingCost {
    #[serde(rename = "Shipping carriers")]
    pub shipping_carrier: String,
    #[serde(rename = "Transportation modes")]
    pub transportation_mode: String,
    #[serde(rename = "Shipping costs")]
    pub shipping_cost: f64,
}

/// Total revenue per product type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTypeRevenue {
    #[serde(rename = "Product type")]
    pub product_type: String,
    #[serde(rename = "Revenue generated")]
    pub revenue: f64,
}

/// Sales and stock figures per location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Revenue generated")]
    pub revenue: f64,
    #[serde(rename = "Number of products sold")]
    pub units_sold: u64,
    /// Mean stock level.
    #[serde(rename = "Stock levels")]
    pub stock_level: f64,
}

/// Running mean.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Groups are never empty, so `count > 0` here.
    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

#[derive(Debug, Default)]
struct LocationAcc {
    revenue: f64,
    units_sold: u64,
    overflowed: bool,
    stock: Mean,
}

/// Fold rows into per-key accumulators, sorted by key.
fn group_by<'a, K, A, I>(
    rows: I,
    key: impl Fn(&'a Record) -> K,
    mut fold: impl FnMut(&mut A, &'a Record),
) -> BTreeMap<K, A>
where
    K: Ord,
    A: Default,
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();
    for row in rows {
        fold(groups.entry(key(row)).or_default(), row);
    }
    groups
}

/// Mean shipping cost by (carrier, mode).
pub fn shipping_rollup<'a>(rows: impl IntoIterator<Item = &'a Record>) -> Vec<ShippingCost> {
    group_by(
        rows,
        |r| (r.shipping_carrier.as_str(), r.transportation_mode.as_str()),
        |acc: &mut Mean, r| acc.add(r.shipping_cost),
    )
    .into_iter()
    .map(|((carrier, mode), mean)| ShippingCost {
        shipping_carrier: carrier.to_string(),
        transportation_mode: mode.to_string(),
        shipping_cost: mean.value(),
    })
    .collect()
}

/// Revenue sum by product type.
pub fn product_type_rollup<'a>(
    rows: impl IntoIterator<Item = &'a Record>,
) -> Vec<ProductTypeRevenue> {
    group_by(
        rows,
        |r| r.product_type.as_str(),
        |acc: &mut f64, r| *acc += r.revenue,
    )
    .into_iter()
    .map(|(product_type, revenue)| ProductTypeRevenue {
        product_type: product_type.to_string(),
        revenue,
    })
    .collect()
}

/// Revenue sum, units sum and mean stock by location.
///
/// Fails with [`AnalyticsError::Overflow`] when a location's units do not
/// fit in `u64`.
pub fn location_rollup<'a>(
    rows: impl IntoIterator<Item = &'a Record>,
) -> AnalyticsResult<Vec<LocationSummary>> {
    group_by(
        rows,
        |r| r.location.as_str(),
        |acc: &mut LocationAcc, r| {
            acc.revenue += r.revenue;
            match acc.units_sold.checked_add(r.units_sold) {
                Some(units) => acc.units_sold = units,
                None => acc.overflowed = true,
            }
            acc.stock.add(r.stock_level as f64);
        },
    )
    .into_iter()
    .map(|(location, acc)| {
        if acc.overflowed {
            return Err(AnalyticsError::Overflow {
                column: columns::UNITS_SOLD,
            });
        }
        Ok(LocationSummary {
            location: location.to_string(),
            revenue: acc.revenue,
            units_sold: acc.units_sold,
            stock_level: acc.stock.value(),
        })
    })
    .collect()
}

/// Every `units_sold` value, unaggregated, in row order.
pub fn sales_distribution<'a>(rows: impl IntoIterator<Item = &'a Record>) -> Vec<u64> {
    rows.into_iter().map(|r| r.units_sold).collect()
}
