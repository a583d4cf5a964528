//! Report resolution and execution.
//!
//! Turning a finalized report configuration into rendered rows:
//!
//! ```text
//! ReportConfig ──▶ resolve_projection ──▶ run_report ──▶ render / export
//!                  (validate + project)   (live or AI)
//! ```
//!
//! Resolution re-validates every table/column lookup against the catalog
//! snapshot it is handed at call time; a refresh after a catalog change runs
//! against the new snapshot, never a stale projection. A [`ViewSession`]
//! tracks the per-view state machine and discards results that were
//! superseded by a newer refresh.

use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Limits;
use crate::format;
use crate::model::{ColumnType, DataSource, FormattingConfig, ReportConfig};
use crate::provider::{AiService, ExportSheet, QueryService, Row, ServiceError, SpreadsheetWriter};

/// Where a report's rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Fetched by the live query collaborator.
    Live,
    /// Generated by the AI collaborator.
    Ai,
}

/// One column of the resolved projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedColumn {
    /// Physical column name; rows are keyed by it.
    pub key: String,
    /// Display label, preferring aliases over physical names.
    pub label: String,
    pub formatting: Option<FormattingConfig>,
    pub column_type: Option<ColumnType>,
}

/// A report resolved against a catalog snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Physical name of the single table or view the report reads.
    pub table_name: String,
    pub is_view: bool,
    pub columns: Vec<ProjectedColumn>,
}

/// Errors raised while resolving or executing a report. Display strings are
/// the user-visible messages.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No columns selected for this report.")]
    NoColumnsSelected,

    #[error("Live data fetch supports a single table or view per report.")]
    MultipleTables,

    #[error("Table/View not found in the selected data source.")]
    TableNotFound,

    #[error("Failed to generate AI data.")]
    AiFetchFailed(#[source] ServiceError),

    #[error("Failed to fetch live data.")]
    LiveFetchFailed(#[source] ServiceError),
}

impl ResolveError {
    /// Whether this is a local validation failure (recoverable by editing
    /// the report) rather than a collaborator failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoColumnsSelected | Self::MultipleTables | Self::TableNotFound
        )
    }
}

/// Resolve a report's projection against a data source: which physical
/// table to read and how each selected column is keyed, labeled, and
/// formatted.
pub fn resolve_projection(
    source: &DataSource,
    report: &ReportConfig,
) -> Result<Resolution, ResolveError> {
    if report.selected_columns.is_empty() {
        return Err(ResolveError::NoColumnsSelected);
    }

    let table_ids = report.distinct_table_ids();
    if table_ids.len() != 1 {
        return Err(ResolveError::MultipleTables);
    }

    let relation = source
        .table_or_view(table_ids[0])
        .ok_or(ResolveError::TableNotFound)?;

    let columns = report
        .selected_columns
        .iter()
        .map(|selected| match relation.column(&selected.column_id) {
            Some(column) => ProjectedColumn {
                key: column.name.clone(),
                label: column.display_label().to_string(),
                formatting: selected.formatting.clone(),
                column_type: Some(column.column_type),
            },
            // Column vanished from the catalog: keep the report renderable,
            // keyed and labeled by the raw identifier.
            None => ProjectedColumn {
                key: selected.column_id.clone(),
                label: selected.column_id.clone(),
                formatting: selected.formatting.clone(),
                column_type: None,
            },
        })
        .collect();

    Ok(Resolution {
        table_name: relation.name().to_string(),
        is_view: relation.is_view(),
        columns,
    })
}

/// The outcome of one successful resolution.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub resolution: Resolution,
    pub rows: Vec<Row>,
    pub origin: DataOrigin,
    /// Wall time of the fetch, in milliseconds.
    pub elapsed_ms: u64,
    pub last_run: DateTime<Utc>,
}

impl ReportData {
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }
}

/// Resolve and execute a report: project, branch on data origin, fetch.
pub async fn run_report<Q, A>(
    query: &Q,
    ai: &A,
    source: &DataSource,
    report: &ReportConfig,
    limits: &Limits,
) -> Result<ReportData, ResolveError>
where
    Q: QueryService + ?Sized,
    A: AiService + ?Sized,
{
    let resolution = resolve_projection(source, report)?;
    let started = Instant::now();

    let (rows, origin) = if source.kind.is_generated() {
        let rows = ai
            .generate_rows(source, report, limits.ai_rows)
            .await
            .map_err(|err| {
                warn!(%err, source = %source.name, "AI row generation failed");
                ResolveError::AiFetchFailed(err)
            })?;
        (rows, DataOrigin::Ai)
    } else {
        let keys: Vec<String> = resolution.columns.iter().map(|c| c.key.clone()).collect();
        let rows = query
            .fetch_rows(
                source,
                &resolution.table_name,
                &keys,
                limits.live_rows,
                &report.filters,
                &report.sorts,
            )
            .await
            .map_err(|err| {
                warn!(%err, table = %resolution.table_name, "live row fetch failed");
                ResolveError::LiveFetchFailed(err)
            })?;
        (rows, DataOrigin::Live)
    };

    Ok(ReportData {
        resolution,
        rows,
        origin,
        elapsed_ms: started.elapsed().as_millis() as u64,
        last_run: Utc::now(),
    })
}

/// Render one row through the formatting engine, in projection order.
pub fn render_row(row: &Row, columns: &[ProjectedColumn]) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            let raw = row.get(&column.key).unwrap_or(&serde_json::Value::Null);
            format::render(raw, column.formatting.as_ref())
        })
        .collect()
}

/// Render every resolved row for display.
pub fn render_table(data: &ReportData) -> Vec<Vec<String>> {
    data.rows
        .iter()
        .map(|row| render_row(row, &data.resolution.columns))
        .collect()
}

// ============================================================================
// View session state machine
// ============================================================================

/// Per-view resolution state.
#[derive(Debug, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Resolving,
    Ready(ReportData),
    Failed(String),
}

/// Token identifying one refresh; completing with a superseded token is a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken(u64);

/// State machine for one report view: `Idle → Resolving → {Ready, Failed}`,
/// re-entered on refresh.
///
/// At most one resolution is live at a time: beginning a refresh supersedes
/// any outstanding one, and the superseded result is discarded when it
/// eventually completes (last write wins). Beginning a refresh also clears
/// the previous result set, so a failed refresh never leaves a stale mix of
/// old rows and new columns.
#[derive(Debug, Default)]
pub struct ViewSession {
    state: ViewState,
    epoch: u64,
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Enter `Resolving` and mint the token the eventual completion must
    /// present.
    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.epoch += 1;
        self.state = ViewState::Resolving;
        RefreshToken(self.epoch)
    }

    /// Complete the refresh identified by `token`. Returns false when the
    /// token was superseded by a newer refresh and the outcome was dropped.
    pub fn complete(
        &mut self,
        token: RefreshToken,
        outcome: Result<ReportData, ResolveError>,
    ) -> bool {
        if token.0 != self.epoch {
            debug!(
                stale = token.0,
                current = self.epoch,
                "discarding superseded resolution result"
            );
            return false;
        }
        self.state = match outcome {
            Ok(data) => ViewState::Ready(data),
            Err(err) => ViewState::Failed(err.to_string()),
        };
        true
    }

    /// The current result set; empty unless the session is `Ready`.
    pub fn data(&self) -> Option<&ReportData> {
        match &self.state {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// The current user-visible error, if the last refresh failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// Errors raised by spreadsheet export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to export.")]
    NoData,

    #[error("Failed to write spreadsheet.")]
    WriteFailed(#[from] ServiceError),
}

static FILENAME_UNSAFE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("[^A-Za-z0-9]+").expect("filename pattern is valid")
});

/// Derive an export filename from a report name: non-alphanumeric runs
/// collapse to a single `_`, suffixed with the given date.
pub fn export_filename(report_name: &str, date: NaiveDate) -> String {
    let collapsed = FILENAME_UNSAFE.replace_all(report_name, "_");
    let stem: &str = if collapsed.is_empty() {
        "report"
    } else {
        collapsed.as_ref()
    };
    format!("{}_{}.xlsx", stem, date.format("%Y-%m-%d"))
}

/// Build the export sheet: every resolved row re-rendered through the
/// formatting engine, keyed by display label. Display and export share one
/// formatting code path by construction.
pub fn build_export_sheet(data: &ReportData) -> ExportSheet {
    ExportSheet {
        headers: data
            .resolution
            .columns
            .iter()
            .map(|c| c.label.clone())
            .collect(),
        rows: render_table(data),
    }
}

/// Export the current result set. Fails loudly when there is nothing to
/// export. Returns the filename written.
pub async fn export_report<W>(
    writer: &W,
    report_name: &str,
    data: &ReportData,
    date: NaiveDate,
) -> Result<String, ExportError>
where
    W: SpreadsheetWriter + ?Sized,
{
    if data.rows.is_empty() {
        return Err(ExportError::NoData);
    }
    let sheet = build_export_sheet(data);
    let filename = export_filename(report_name, date);
    writer.write(&sheet, &filename).await?;
    Ok(filename)
}
