//! Report builder engine.
//!
//! [`ReportBuilder`] owns one in-progress [`ReportConfig`] and keeps it
//! internally consistent while the user edits it: column toggles, type-aware
//! filter resets, sort management, and per-column formatting. It borrows a
//! catalog snapshot for column/type lookups but never mutates it.

use serde_json::Value;
use tracing::{debug, warn};

use crate::format::default_formatting;
use crate::model::{
    ColumnType, DataSource, FilterCondition, FilterOperator, FormattingConfig, ReportColumn,
    ReportConfig, SortCondition, SortDirection,
};
use crate::operators::{self, FALLBACK_OPERATORS};

/// Builder tab. Purely presentational; any tab is reachable from any tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    #[default]
    Data,
    Filter,
    Visual,
}

/// Partial update for a filter condition. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub table_id: Option<String>,
    pub column_id: Option<String>,
    pub operator: Option<FilterOperator>,
    pub value: Option<String>,
    /// `Some(None)` clears the second value.
    pub value2: Option<Option<String>>,
}

/// Partial update for a sort condition.
#[derive(Debug, Clone, Default)]
pub struct SortPatch {
    pub table_id: Option<String>,
    pub column_id: Option<String>,
    pub direction: Option<SortDirection>,
}

/// Mutation/validation engine for one in-progress report configuration.
#[derive(Debug)]
pub struct ReportBuilder<'a> {
    catalog: &'a [DataSource],
    config: ReportConfig,
    active_tab: ActiveTab,
}

impl<'a> ReportBuilder<'a> {
    /// Start a fresh report owned by `owner_id`, defaulting to the first
    /// catalog data source when one exists.
    pub fn new(catalog: &'a [DataSource], owner_id: impl Into<String>) -> Self {
        let mut config = ReportConfig::new(owner_id);
        if let Some(first) = catalog.first() {
            config.data_source_id = first.id.clone();
        }
        Self {
            catalog,
            config,
            active_tab: ActiveTab::default(),
        }
    }

    /// Edit an existing report configuration.
    pub fn edit(catalog: &'a [DataSource], config: ReportConfig) -> Self {
        Self {
            catalog,
            config,
            active_tab: ActiveTab::default(),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Hand the configuration back, e.g. for persistence.
    pub fn into_config(self) -> ReportConfig {
        self.config
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
    }

    /// The currently selected data source, if it exists in the catalog.
    pub fn data_source(&self) -> Option<&'a DataSource> {
        self.catalog
            .iter()
            .find(|ds| ds.id == self.config.data_source_id)
    }

    /// Switch data source. Clears columns, filters, and sorts: every column
    /// reference is invalidated by the switch.
    pub fn change_data_source(&mut self, data_source_id: impl Into<String>) {
        self.config.data_source_id = data_source_id.into();
        self.config.selected_columns.clear();
        self.config.filters.clear();
        self.config.sorts.clear();
    }

    // =========================================================================
    // Column selection
    // =========================================================================

    /// Add the column if absent (without formatting; formatting is opt-in),
    /// remove it if present.
    pub fn toggle_column(&mut self, table_id: &str, column_id: &str) {
        let before = self.config.selected_columns.len();
        self.config
            .selected_columns
            .retain(|c| !c.refers_to(table_id, column_id));
        if self.config.selected_columns.len() == before {
            self.config
                .selected_columns
                .push(ReportColumn::new(table_id, column_id));
        }
    }

    pub fn is_column_selected(&self, table_id: &str, column_id: &str) -> bool {
        self.config
            .selected_columns
            .iter()
            .any(|c| c.refers_to(table_id, column_id))
    }

    /// Semantic type of a column in the selected data source.
    pub fn column_type(&self, table_id: &str, column_id: &str) -> Option<ColumnType> {
        self.data_source()?
            .table_or_view(table_id)?
            .column(column_id)
            .map(|c| c.column_type)
    }

    /// "Table.Column" display label, preferring aliases.
    pub fn column_label(&self, table_id: &str, column_id: &str) -> String {
        let Some(relation) = self
            .data_source()
            .and_then(|ds| ds.table_or_view(table_id))
        else {
            warn!(table_id, "table not found in selected data source");
            return "[Table Not Found].[Column Not Found]".to_string();
        };
        match relation.column(column_id) {
            Some(column) => format!("{}.{}", relation.display_label(), column.display_label()),
            None => {
                warn!(column_id, table = relation.name(), "column not found");
                format!("{}.[Column Not Found]", relation.display_label())
            }
        }
    }

    // =========================================================================
    // Column formatting
    // =========================================================================

    /// Attach the type's default formatting to a selected column.
    pub fn enable_formatting(&mut self, table_id: &str, column_id: &str) {
        let column_type = self
            .column_type(table_id, column_id)
            .unwrap_or(ColumnType::String);
        self.set_formatting(table_id, column_id, Some(default_formatting(column_type)));
    }

    /// Detach formatting from a selected column.
    pub fn disable_formatting(&mut self, table_id: &str, column_id: &str) {
        self.set_formatting(table_id, column_id, None);
    }

    /// Update a single field of a column's formatting config, preserving the
    /// other fields of the variant. Enables formatting with the type default
    /// first if the column has none yet.
    pub fn update_formatting_field(
        &mut self,
        table_id: &str,
        column_id: &str,
        field: &str,
        value: Value,
    ) {
        let column_type = self
            .column_type(table_id, column_id)
            .unwrap_or(ColumnType::String);
        let Some(column) = self
            .config
            .selected_columns
            .iter_mut()
            .find(|c| c.refers_to(table_id, column_id))
        else {
            return;
        };

        let current = column
            .formatting
            .clone()
            .unwrap_or_else(|| default_formatting(column_type));
        if matches!(current, FormattingConfig::None) {
            return;
        }

        // Patch the field through the wire form so the variant's remaining
        // fields survive untouched.
        let Ok(mut tree) = serde_json::to_value(&current) else {
            return;
        };
        if let Some(Value::Object(config)) = tree.get_mut("config") {
            config.insert(field.to_string(), value);
        }
        match serde_json::from_value::<FormattingConfig>(tree) {
            Ok(updated) => column.formatting = Some(updated),
            Err(err) => warn!(%err, field, "ignoring formatting update that does not fit the config"),
        }
    }

    fn set_formatting(
        &mut self,
        table_id: &str,
        column_id: &str,
        formatting: Option<FormattingConfig>,
    ) {
        if let Some(column) = self
            .config
            .selected_columns
            .iter_mut()
            .find(|c| c.refers_to(table_id, column_id))
        {
            column.formatting = formatting;
        }
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Append a filter defaulted to the first exposed table's first column
    /// and the first legal operator for that column's type. Silent no-op when
    /// the selected source has no exposed table with columns.
    pub fn add_filter(&mut self) {
        let Some(source) = self.data_source() else {
            return;
        };
        let Some(first) = source.exposed_relations().next() else {
            debug!("add_filter ignored: no exposed tables in data source");
            return;
        };
        let Some(first_column) = first.columns().first() else {
            debug!(table = first.name(), "add_filter ignored: table has no columns");
            return;
        };

        let filter = FilterCondition {
            id: uuid::Uuid::new_v4().to_string(),
            table_id: first.id().to_string(),
            column_id: first_column.id.clone(),
            operator: operators::default_operator(first_column.column_type),
            value: String::new(),
            value2: None,
        };
        self.config.filters.push(filter);
    }

    /// Merge a partial update into the filter at `index`.
    ///
    /// When the update changes the column, the owning table is re-resolved,
    /// the operator resets to the first legal operator for the new column's
    /// type, and both values are cleared — stale operator/value combinations
    /// must not survive a column switch.
    pub fn update_filter(&mut self, index: usize, patch: FilterPatch) {
        if index >= self.config.filters.len() {
            return;
        }
        let current_table = self.config.filters[index].table_id.clone();
        let current_column = self.config.filters[index].column_id.clone();

        let mut reset: Option<(Option<String>, FilterOperator)> = None;
        if let Some(column_id) = patch.column_id.as_ref().filter(|c| **c != current_column) {
            let resolved_table = self.owning_table(column_id);
            let lookup_table = resolved_table
                .clone()
                .or_else(|| patch.table_id.clone())
                .unwrap_or(current_table);
            let operator = match self.column_type(&lookup_table, column_id) {
                Some(column_type) => operators::default_operator(column_type),
                None => FALLBACK_OPERATORS[0].operator,
            };
            reset = Some((resolved_table, operator));
        }

        let filter = &mut self.config.filters[index];
        if let Some(table_id) = patch.table_id {
            filter.table_id = table_id;
        }
        if let Some(column_id) = patch.column_id {
            filter.column_id = column_id;
        }
        if let Some(operator) = patch.operator {
            filter.operator = operator;
        }
        if let Some(value) = patch.value {
            filter.value = value;
        }
        if let Some(value2) = patch.value2 {
            filter.value2 = value2;
        }
        if let Some((resolved_table, operator)) = reset {
            if let Some(table_id) = resolved_table {
                filter.table_id = table_id;
            }
            filter.operator = operator;
            filter.value = String::new();
            filter.value2 = None;
        }
    }

    pub fn remove_filter(&mut self, index: usize) {
        if index < self.config.filters.len() {
            self.config.filters.remove(index);
        }
    }

    /// The exposed table owning a column ID, searched across the selected
    /// source's exposed tables and views.
    fn owning_table(&self, column_id: &str) -> Option<String> {
        let source = self.data_source()?;
        source
            .exposed_relations()
            .find(|r| r.columns().iter().any(|c| c.id == column_id))
            .map(|r| r.id().to_string())
    }

    // =========================================================================
    // Sorts
    // =========================================================================

    /// Append an ascending sort on the first selected column. Returns false
    /// (and warns) when no column is selected yet.
    pub fn add_sort(&mut self) -> bool {
        let Some(first) = self.config.selected_columns.first() else {
            warn!("cannot add a sort before any column is selected");
            return false;
        };
        let (table_id, column_id) = (first.table_id.clone(), first.column_id.clone());
        self.config.sorts.push(SortCondition {
            table_id,
            column_id,
            direction: SortDirection::Asc,
        });
        true
    }

    /// Merge a partial update into the sort at `index`.
    pub fn update_sort(&mut self, index: usize, patch: SortPatch) {
        let Some(sort) = self.config.sorts.get_mut(index) else {
            return;
        };
        if let Some(table_id) = patch.table_id {
            sort.table_id = table_id;
        }
        if let Some(column_id) = patch.column_id {
            sort.column_id = column_id;
        }
        if let Some(direction) = patch.direction {
            sort.direction = direction;
        }
    }

    pub fn remove_sort(&mut self, index: usize) {
        if index < self.config.sorts.len() {
            self.config.sorts.remove(index);
        }
    }
}
