//! ABC classification by cumulative share of units sold.
//!
//! # Algorithm
//!
//! ```text
//! records ──stable sort by units_sold desc──▶ ranked
//!         ──running sum / total──▶ cumulative_share
//!         ──thresholds (0.80, 0.95)──▶ A | B | C
//!         ──join──▶ class per output row
//! ```
//!
//! Ties in `units_sold` keep source order, so the same dataset always yields
//! the same classes.
//!
//! # Joining classes back
//!
//! [`SkuJoin::Rank`] gives each record the class computed for its own rank.
//! [`SkuJoin::Sku`] reproduces a left join on `sku`: when SKUs repeat, each
//! record is emitted once per ranked row sharing its SKU. Only use it when
//! parity with SKU-keyed output is required.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::analytics::kpi::checked_total;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{columns, AbcClass, Record};

/// A record's position in the units-sold ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRecord {
    /// Index into the source dataset.
    pub index: usize,
    pub units_sold: u64,
    /// Units sold by this row and every row ranked above it.
    pub cumulative_units: u64,
    pub cumulative_share: f64,
    pub class: AbcClass,
}

/// How computed classes are attached to the dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkuJoin {
    /// One output row per record, class taken from its own rank.
    #[default]
    Rank,
    /// Left join on `sku`, duplicating rows whose SKU repeats.
    Sku,
}

impl FromStr for SkuJoin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rank" => Ok(SkuJoin::Rank),
            "sku" => Ok(SkuJoin::Sku),
            other => Err(format!("unknown join strategy '{}' (expected 'rank' or 'sku')", other)),
        }
    }
}

/// Rank records by units sold (descending, stable) and classify each rank.
///
/// Fails with [`AnalyticsError::ZeroUnitsSold`] when nothing sold, since the
/// cumulative share would divide by zero, and with
/// [`AnalyticsError::Overflow`] when the total does not fit in `u64`.
pub fn rank_by_units(records: &[Record]) -> AnalyticsResult<Vec<RankedRecord>> {
    let total = checked_total(records.iter().map(|r| r.units_sold), columns::UNITS_SOLD)?;
    if total == 0 {
        return Err(AnalyticsError::ZeroUnitsSold);
    }

    let mut order: Vec<usize> = (0..records.len()).collect();
    // `sort_by` is stable
    order.sort_by(|&a, &b| records[b].units_sold.cmp(&records[a].units_sold));

    // Bounded by `total`
    let mut cumulative_units = 0u64;
    let ranked = order
        .into_iter()
        .map(|index| {
            let units_sold = records[index].units_sold;
            cumulative_units += units_sold;
            let cumulative_share = cumulative_units as f64 / total as f64;
            RankedRecord {
                index,
                units_sold,
                cumulative_units,
                cumulative_share,
                class: AbcClass::from_share(cumulative_share),
            }
        })
        .collect();

    Ok(ranked)
}

/// Class of every record, indexed like the source dataset.
pub fn classify(records: &[Record]) -> AnalyticsResult<Vec<AbcClass>> {
    let ranked = rank_by_units(records)?;
    let mut classes = vec![AbcClass::C; records.len()];
    for r in &ranked {
        classes[r.index] = r.class;
    }
    Ok(classes)
}

/// Attach ranked classes to records using the chosen strategy.
///
/// Output follows source order. With [`SkuJoin::Sku`], a record whose SKU
/// appears `k` times yields `k` rows, in ranking order.
pub fn join_classes<'a>(
    records: &'a [Record],
    ranked: &[RankedRecord],
    join: SkuJoin,
) -> Vec<(&'a Record, AbcClass)> {
    match join {
        SkuJoin::Rank => {
            let mut classes = vec![AbcClass::C; records.len()];
            for r in ranked {
                classes[r.index] = r.class;
            }
            records.iter().zip(classes).collect()
        }
        SkuJoin::Sku => {
            let mut by_sku: HashMap<&str, Vec<AbcClass>> = HashMap::new();
            for r in ranked {
                by_sku
                    .entry(records[r.index].sku.as_str())
                    .or_default()
                    .push(r.class);
            }

            records
                .iter()
                .flat_map(|record| {
                    by_sku
                        .get(record.sku.as_str())
                        .into_iter()
                        .flatten()
                        .map(move |&class| (record, class))
                })
                .collect()
        }
    }
}
