//! # Gridline
//!
//! A self-serve reporting engine: non-technical users define tabular and
//! visual reports against heterogeneous data sources without writing queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   Schema Catalog                         │
//! │   (data sources, tables/views, typed columns)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [builder + operator matrix]
//! ┌─────────────────────────────────────────────────────────┐
//! │              ReportConfig (Rust Types)                   │
//! │   (columns, filters, sorts, formatting, schedule)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Validated Report Configuration              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolve: live query or AI]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Row Set + Projection (origin: live/ai)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [format]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Rendered table / exported spreadsheet          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Network transport, AI prompt construction, persistence mechanics, and all
//! presentation are external collaborators reached through the async traits
//! in [`provider`]. Everything else in the pipeline is synchronous and pure.

pub mod builder;
pub mod config;
pub mod format;
pub mod model;
pub mod operators;
pub mod provider;
pub mod resolve;
pub mod state;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::builder::{ActiveTab, FilterPatch, ReportBuilder, SortPatch};
    pub use crate::format::{default_formatting, render};
    pub use crate::model::{
        ColumnDef, ColumnType, DataSource, DataSourceKind, FilterCondition, FilterOperator,
        FormattingConfig, Relation, ReportColumn, ReportConfig, SortCondition, SortDirection,
        TableDef, ViewDef,
    };
    pub use crate::operators::{operators_for, OperatorOption, FALLBACK_OPERATORS};
    pub use crate::provider::{
        AiService, CatalogService, QueryService, ReportStoreService, Row, ServiceError,
        SpreadsheetWriter,
    };
    pub use crate::resolve::{
        resolve_projection, run_report, DataOrigin, ReportData, Resolution, ViewSession, ViewState,
    };
    pub use crate::validation::{validate_report, ValidationError};
}

// Also export the aggregate roots at the crate root for convenience
pub use model::{DataSource, ReportConfig};
