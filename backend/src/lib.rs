//! # Supplychain - dashboard analytics for supply-chain datasets
//!
//! Turns a supply-chain CSV (one row per SKU record) into the payload the
//! dashboard renders: KPIs, ABC classes, inventory efficiency and rollups.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────┐   ┌─────────┐   ┌─────────┐   ┌───────────┐   ┌──────────┐
//! │  CSV File   │──▶│ Loader  │──▶│   KPI   │──▶│   ABC   │──▶│ Inventory │──▶│ Rollups  │──▶ payload
//! │ (auto-enc)  │   │(parser) │   │ summary │   │ classes │   │  metrics  │   │ + hist   │
//! └─────────────┘   └─────────┘   └─────────┘   └─────────┘   └───────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use supplychain::{build_dashboard, PipelineOptions};
//!
//! fn main() -> Result<(), supplychain::PipelineError> {
//!     let payload = build_dashboard("data/raw/supply_chain_data.csv", PipelineOptions::default())?;
//!     println!("{} SKUs, revenue {}", payload.inventory.len(), payload.summary.total_revenue);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Records, ABC classes, derived fields
//! - [`parser`] - CSV loading with auto-detection
//! - [`analytics`] - KPI, ABC, inventory metrics, rollups, pipeline
//! - [`config`] - Environment-driven settings
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;

// Analytics
pub mod analytics;

// Settings
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalyticsError, ErrorKind, PipelineError, PipelineResult, ServerError, SourceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AbcClass, Dataset, EnrichedRecord, InventoryMetrics, Record};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, format_delimiter, load_dataset,
    parse_bytes_auto, parse_csv, ParseResult,
};

// =============================================================================
// Re-exports - Analytics
// =============================================================================

pub use analytics::{
    classify, days_of_inventory, join_classes, rank_by_units, summarize, turnover_rate,
    InventoryRow, KpiSummary, LocationSummary, ProductTypeRevenue, RankedRecord, ShippingCost,
    SkuJoin,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use analytics::pipeline::{analyze, build_dashboard, DashboardPayload, PipelineOptions, Stage};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::Config;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
