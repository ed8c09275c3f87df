//! High-level pipeline API: source file to dashboard payload.
//!
//! Stages run strictly in sequence, each on the output of the previous one:
//!
//! ```text
//! Loaded → Summarized → Classified → MetricsComputed → Grouped → Assembled
//! ```
//!
//! The first failing stage aborts the run; no partial payload is returned.
//! Nothing is cached between runs, so every call reloads the source.
//!
//! # Example
//!
//! ```rust,ignore
//! use supplychain::{build_dashboard, PipelineOptions};
//!
//! let payload = build_dashboard("data/raw/supply_chain_data.csv", PipelineOptions::default())?;
//! println!("Total revenue: {}", payload.summary.total_revenue);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::abc::{join_classes, rank_by_units, RankedRecord, SkuJoin};
use super::grouper::{
    location_rollup, product_type_rollup, sales_distribution, shipping_rollup, LocationSummary,
    ProductTypeRevenue, ShippingCost,
};
use super::inventory::{enrich, InventoryRow};
use super::kpi::{summarize, KpiSummary};
use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{AbcClass, EnrichedRecord, Record};
use crate::parser::{format_delimiter, load_dataset};

/// Options for the analytics pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// How ABC classes are joined back onto records
    pub join: SkuJoin,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Loaded,
    Summarized,
    Classified,
    MetricsComputed,
    Grouped,
    Assembled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "Loaded",
            Stage::Summarized => "Summarized",
            Stage::Classified => "Classified",
            Stage::MetricsComputed => "MetricsComputed",
            Stage::Grouped => "Grouped",
            Stage::Assembled => "Assembled",
        };
        f.write_str(name)
    }
}

impl Stage {
    /// The work that produces this stage, as named in failure logs.
    pub fn step(&self) -> &'static str {
        match self {
            Stage::Loaded => "loading",
            Stage::Summarized => "KPI summary",
            Stage::Classified => "ABC classification",
            Stage::MetricsComputed => "inventory metrics",
            Stage::Grouped => "grouping",
            Stage::Assembled => "assembly",
        }
    }
}

/// Everything the dashboard renders, produced by one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPayload {
    pub summary: KpiSummary,
    pub inventory: Vec<InventoryRow>,
    pub shipping: Vec<ShippingCost>,
    pub product_types: Vec<ProductTypeRevenue>,
    pub location_data: Vec<LocationSummary>,
    pub sales_hist: Vec<u64>,
    /// Full enriched dataset for ad-hoc filtering
    pub raw_data: Vec<EnrichedRecord>,
}

/// Load the source at `path` and run every stage on it.
///
/// A missing file fails with a `SourceNotFound`-kind error before any
/// analytics run.
pub fn build_dashboard<P: AsRef<Path>>(
    path: P,
    options: PipelineOptions,
) -> PipelineResult<DashboardPayload> {
    let path = path.as_ref();
    log_info(format!("📖 Loading {}", path.display()));

    let parsed = load_dataset(path).map_err(|e| fail(Stage::Loaded, e.into()))?;
    log_success(format!(
        "{}: {} rows, {} columns (encoding {}, delimiter '{}')",
        Stage::Loaded,
        parsed.records.len(),
        parsed.headers.len(),
        parsed.encoding,
        format_delimiter(parsed.delimiter),
    ));

    analyze(&parsed.records, options)
}

/// Run every analytics stage on an in-memory dataset.
pub fn analyze(records: &[Record], options: PipelineOptions) -> PipelineResult<DashboardPayload> {
    let summary = summarize(records).map_err(|e| fail(Stage::Summarized, e.into()))?;
    log_success(format!(
        "{}: revenue {:.2}, {} units sold, {} in stock",
        Stage::Summarized,
        summary.total_revenue,
        summary.total_sold,
        summary.total_stock
    ));

    let ranked = rank_by_units(records).map_err(|e| fail(Stage::Classified, e.into()))?;
    let classified = join_classes(records, &ranked, options.join);
    if classified.len() != records.len() {
        log_warning(format!(
            "SKU join expanded {} rows to {} (repeated SKUs)",
            records.len(),
            classified.len()
        ));
    }
    log_success(format!("{}: {}", Stage::Classified, class_counts(&ranked)));

    let enriched = enrich(classified);
    let no_sales = enriched
        .iter()
        .filter(|e| e.record.units_sold == 0)
        .count();
    log_success(format!("{}: {} rows", Stage::MetricsComputed, enriched.len()));
    if no_sales > 0 {
        log_info_indent(format!("{} rows with no sales (DOI = 999)", no_sales), 1);
    }

    let rows = || enriched.iter().map(|e| &e.record);
    let shipping = shipping_rollup(rows());
    let product_types = product_type_rollup(rows());
    let location_data = location_rollup(rows()).map_err(|e| fail(Stage::Grouped, e.into()))?;
    let sales_hist = sales_distribution(rows());
    log_success(format!(
        "{}: {} shipping lanes, {} product types, {} locations",
        Stage::Grouped,
        shipping.len(),
        product_types.len(),
        location_data.len()
    ));

    let payload = DashboardPayload {
        summary,
        inventory: enriched.iter().map(InventoryRow::from).collect(),
        shipping,
        product_types,
        location_data,
        sales_hist,
        raw_data: enriched,
    };
    log_success(Stage::Assembled.to_string());

    Ok(payload)
}

fn fail(stage: Stage, err: PipelineError) -> PipelineError {
    log_error(format!("Pipeline failed during {}: {}", stage.step(), err));
    err
}

fn class_counts(ranked: &[RankedRecord]) -> String {
    let count = |class: AbcClass| ranked.iter().filter(|r| r.class == class).count();
    format!(
        "A={} B={} C={}",
        count(AbcClass::A),
        count(AbcClass::B),
        count(AbcClass::C)
    )
}
