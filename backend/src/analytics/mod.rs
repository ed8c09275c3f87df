//! Analytics module.
//!
//! Turns a loaded [`crate::Dataset`] into dashboard metrics:
//! - KPI: dataset-wide summary statistics
//! - ABC: Pareto classification by units sold
//! - Inventory: per-row days-of-inventory and turnover
//! - Grouper: shipping, product-type and location rollups
//! - Pipeline: stage orchestration and payload assembly

pub mod abc;
pub mod grouper;
pub mod inventory;
pub mod kpi;
pub mod pipeline;

pub use abc::{classify, join_classes, rank_by_units, RankedRecord, SkuJoin};
pub use grouper::{
    location_rollup, product_type_rollup, sales_distribution, shipping_rollup, LocationSummary,
    ProductTypeRevenue, ShippingCost,
};
pub use inventory::{days_of_inventory, enrich, inventory_metrics, turnover_rate, InventoryRow};
pub use kpi::{summarize, KpiSummary};
pub use pipeline::*;
