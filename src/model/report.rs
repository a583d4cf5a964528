//! Report configuration: the document a user edits in the builder.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::formatting::FormattingConfig;

/// Aggregation applied to a report column.
///
/// Modeled on the configuration but not consulted by resolution; an
/// extension point for grouped reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    None,
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// How a report's rows are visualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationType {
    #[default]
    Table,
    Bar,
    Line,
    Pie,
    Area,
}

/// Who can see a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

/// A column selected into a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportColumn {
    pub table_id: String,
    pub column_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    /// Opt-in: columns are added without formatting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<FormattingConfig>,
}

impl ReportColumn {
    pub fn new(table_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column_id: column_id.into(),
            alias: None,
            aggregation: None,
            formatting: None,
        }
    }

    pub fn refers_to(&self, table_id: &str, column_id: &str) -> bool {
        self.table_id == table_id && self.column_id == column_id
    }
}

/// A filter operator.
///
/// Which operators are legal for a given column type is decided by the
/// compatibility matrix in [`crate::operators`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    In,
    Today,
    ThisWeek,
    ThisMonth,
    ThisYear,
}

impl FilterOperator {
    /// Wire name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Between => "between",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
            FilterOperator::IsEmpty => "is_empty",
            FilterOperator::IsNotEmpty => "is_not_empty",
            FilterOperator::In => "in",
            FilterOperator::Today => "today",
            FilterOperator::ThisWeek => "this_week",
            FilterOperator::ThisMonth => "this_month",
            FilterOperator::ThisYear => "this_year",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filter applied to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    pub id: String,
    pub table_id: String,
    pub column_id: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
    /// Second bound; only range operators carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
}

/// A sort applied to a report. Duplicate sort keys are permitted but
/// redundant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortCondition {
    pub table_id: String,
    pub column_id: String,
    pub direction: SortDirection,
}

/// How often a scheduled report runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

/// Report delivery schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub frequency: ScheduleFrequency,
    pub time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: ScheduleFrequency::Weekly,
            time: "09:00".to_string(),
        }
    }
}

/// A report configuration: the persisted, user-editable document describing
/// what a report shows and how.
///
/// Invariant: every `table_id` referenced by columns, filters, and sorts must
/// resolve to the same single table or view; multi-table reports are
/// unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    pub id: String,
    pub data_source_id: String,
    pub owner_id: String,
    pub visibility: Visibility,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub selected_columns: Vec<ReportColumn>,
    pub filters: Vec<FilterCondition>,
    pub sorts: Vec<SortCondition>,
    /// Extension point; not consulted by resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<ReportColumn>>,
    pub visualization: VisualizationType,
    pub schedule: ScheduleConfig,
    #[serde(default, rename = "created_at")]
    pub created_at: String,
}

impl ReportConfig {
    /// A fresh report: generated identifier, empty column/filter/sort lists,
    /// table visualization, private, schedule disabled.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data_source_id: String::new(),
            owner_id: owner_id.into(),
            visibility: Visibility::Private,
            name: "New Report".to_string(),
            description: String::new(),
            selected_columns: Vec::new(),
            filters: Vec::new(),
            sorts: Vec::new(),
            group_by: None,
            visualization: VisualizationType::Table,
            schedule: ScheduleConfig::default(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Distinct `table_id`s referenced by the selected columns, in first-seen
    /// order.
    pub fn distinct_table_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for column in &self.selected_columns {
            if !ids.contains(&column.table_id.as_str()) {
                ids.push(&column.table_id);
            }
        }
        ids
    }
}
