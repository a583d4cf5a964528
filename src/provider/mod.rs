//! Collaborator contracts.
//!
//! Everything network-bound lives behind these async traits: schema/row
//! fetching, AI schema discovery and row generation, report/data-source
//! persistence, and spreadsheet writing. The engine itself stays synchronous
//! and pure; implementations of these traits own transport, retries, and
//! credentials.

mod error;
pub mod xlsx;

pub use error::{ServiceError, ServiceResult};
pub use xlsx::XlsxWriter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::model::{
    ColumnDef, ColumnType, ConnectionDetails, DataSource, DataSourceKind, FilterCondition,
    ReportConfig, SortCondition, TableDef, ViewDef,
};

/// A fetched or generated row, keyed by physical column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Tables and views discovered by a connection test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveredSchema {
    pub tables: Vec<TableDef>,
    #[serde(default)]
    pub views: Vec<ViewDef>,
}

/// Catalog service: the read-only view of available data sources.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// List all data sources, including their tables/views and exposure
    /// flags.
    async fn list(&self) -> ServiceResult<Vec<DataSource>>;

    /// Test a connection and introspect its schema.
    async fn test_connection(
        &self,
        kind: DataSourceKind,
        details: &ConnectionDetails,
    ) -> ServiceResult<DiscoveredSchema>;
}

/// Live query service: fetches rows from a real database via the backend.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Fetch rows from `table`, projected to `columns` (physical names),
    /// with filters and sorts applied backend-side.
    async fn fetch_rows(
        &self,
        source: &DataSource,
        table: &str,
        columns: &[String],
        limit: usize,
        filters: &[FilterCondition],
        sorts: &[SortCondition],
    ) -> ServiceResult<Vec<Row>>;
}

/// A table shape returned by AI schema discovery, before identifiers are
/// assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveredTable {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub columns: Vec<DiscoveredColumn>,
}

/// A column shape returned by AI schema discovery.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sample_value: Option<String>,
}

/// AI schema/data service for `custom` data sources.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Generate a plausible schema for a described database.
    async fn discover_schema(
        &self,
        kind: DataSourceKind,
        name: &str,
        context: &str,
    ) -> ServiceResult<Vec<DiscoveredTable>>;

    /// Generate up to `row_count` rows matching a report's schema, columns,
    /// filters, and sorts.
    async fn generate_rows(
        &self,
        source: &DataSource,
        report: &ReportConfig,
        row_count: usize,
    ) -> ServiceResult<Vec<Row>>;
}

/// Hydrate discovered tables into catalog tables: fresh identifiers for
/// every table and column, exposed by default. Identifiers are v4 UUIDs —
/// unique within the catalog, nothing more is promised.
pub fn hydrate_tables(discovered: Vec<DiscoveredTable>) -> Vec<TableDef> {
    discovered
        .into_iter()
        .map(|table| {
            let columns = table
                .columns
                .into_iter()
                .map(|column| ColumnDef {
                    id: Uuid::new_v4().to_string(),
                    alias: Some(column.alias.unwrap_or_else(|| column.name.clone())),
                    name: column.name,
                    column_type: column.column_type,
                    description: Some(column.description.unwrap_or_default()),
                    sample_value: Some(column.sample_value.unwrap_or_default()),
                    is_pii: false,
                    is_nullable: false,
                    is_primary_key: false,
                    is_unique: false,
                })
                .collect();
            TableDef {
                id: Uuid::new_v4().to_string(),
                alias: Some(table.alias.unwrap_or_else(|| table.name.clone())),
                name: table.name,
                description: Some(table.description.unwrap_or_default()),
                columns,
                exposed: true,
                foreign_keys: Vec::new(),
                indexes: Vec::new(),
                constraints: Vec::new(),
            }
        })
        .collect()
}

/// Persistence service: CRUD for reports and data sources.
#[async_trait]
pub trait ReportStoreService: Send + Sync {
    async fn list_reports(&self) -> ServiceResult<Vec<ReportConfig>>;

    async fn get_report(&self, id: &str) -> ServiceResult<ReportConfig>;

    async fn create_report(&self, report: &ReportConfig) -> ServiceResult<ReportConfig>;

    async fn update_report(&self, id: &str, report: &ReportConfig) -> ServiceResult<ReportConfig>;

    async fn delete_report(&self, id: &str) -> ServiceResult<()>;

    async fn list_data_sources(&self) -> ServiceResult<Vec<DataSource>>;

    async fn create_data_source(&self, source: &DataSource) -> ServiceResult<DataSource>;

    async fn update_data_source(&self, id: &str, source: &DataSource)
        -> ServiceResult<DataSource>;

    async fn delete_data_source(&self, id: &str) -> ServiceResult<()>;

    /// Batch fetch multiple reports.
    ///
    /// Default implementation fetches in parallel using `join_all`.
    async fn get_reports_batch(&self, ids: &[String]) -> ServiceResult<Vec<ReportConfig>> {
        let futures: Vec<_> = ids.iter().map(|id| self.get_report(id)).collect();
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}

/// Save a report, recovering from a stale edit: when an update reports the
/// target missing, the report is re-created under a fresh identifier.
pub async fn save_report<S>(
    store: &S,
    mut report: ReportConfig,
    is_update: bool,
) -> ServiceResult<ReportConfig>
where
    S: ReportStoreService + ?Sized,
{
    if is_update {
        let id = report.id.clone();
        match store.update_report(&id, &report).await {
            Ok(saved) => return Ok(saved),
            Err(err) if err.is_not_found() => {
                warn!(report_id = %report.id, "report missing on update, creating it instead");
                report.id = Uuid::new_v4().to_string();
            }
            Err(err) => return Err(err),
        }
    }
    store.create_report(&report).await
}

/// A rendered export: header labels plus formatted rows, both in display
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Spreadsheet export collaborator.
#[async_trait]
pub trait SpreadsheetWriter: Send + Sync {
    /// Write a sheet to `filename`.
    async fn write(&self, sheet: &ExportSheet, filename: &str) -> ServiceResult<()>;
}
