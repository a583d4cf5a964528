//! Validation of report configurations against a catalog snapshot.
//!
//! All problems are collected, not just the first one, so the caller can
//! surface every issue in a single pass.

use std::collections::HashSet;

use crate::model::{ColumnType, DataSource, FilterOperator, ReportConfig};
use crate::operators;

/// A single problem found in a report configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("report has no columns selected")]
    NoColumnsSelected,

    #[error("column '{column_id}' of table '{table_id}' is selected more than once")]
    DuplicateColumn { table_id: String, column_id: String },

    #[error("report references {count} tables; a report may use a single table or view")]
    MultipleTables { count: usize },

    #[error("{context} references unknown table '{table_id}'")]
    UnknownTable {
        context: &'static str,
        table_id: String,
    },

    #[error("{context} references unknown column '{column_id}' in table '{table_id}'")]
    UnknownColumn {
        context: &'static str,
        table_id: String,
        column_id: String,
    },

    #[error("operator '{operator}' is not legal for {column_type} column '{column_id}'")]
    IllegalOperator {
        column_id: String,
        column_type: ColumnType,
        operator: FilterOperator,
    },

    #[error("filter on '{column_id}' uses operator '{operator}' but has no value")]
    MissingValue {
        column_id: String,
        operator: FilterOperator,
    },

    #[error("filter on '{column_id}' uses a range operator but has no second value")]
    MissingSecondValue { column_id: String },

    #[error("column '{column_id}' is {column_type} but carries {formatting_type} formatting")]
    FormattingMismatch {
        column_id: String,
        column_type: ColumnType,
        formatting_type: ColumnType,
    },
}

/// Validate a report configuration against the data source it targets.
///
/// Returns every violation found; `Ok(())` means the configuration is
/// internally consistent and fully resolvable.
pub fn validate_report(
    source: &DataSource,
    report: &ReportConfig,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_single_table(report, &mut errors);
    validate_columns(source, report, &mut errors);
    validate_filters(source, report, &mut errors);
    validate_sorts(source, report, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_single_table(report: &ReportConfig, errors: &mut Vec<ValidationError>) {
    let mut table_ids: Vec<&str> = report.distinct_table_ids();
    for filter in &report.filters {
        if !table_ids.contains(&filter.table_id.as_str()) {
            table_ids.push(&filter.table_id);
        }
    }
    for sort in &report.sorts {
        if !table_ids.contains(&sort.table_id.as_str()) {
            table_ids.push(&sort.table_id);
        }
    }
    if table_ids.len() > 1 {
        errors.push(ValidationError::MultipleTables {
            count: table_ids.len(),
        });
    }
}

fn validate_columns(
    source: &DataSource,
    report: &ReportConfig,
    errors: &mut Vec<ValidationError>,
) {
    if report.selected_columns.is_empty() {
        errors.push(ValidationError::NoColumnsSelected);
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for selected in &report.selected_columns {
        if !seen.insert((&selected.table_id, &selected.column_id)) {
            errors.push(ValidationError::DuplicateColumn {
                table_id: selected.table_id.clone(),
                column_id: selected.column_id.clone(),
            });
        }

        let Some(relation) = source.table_or_view(&selected.table_id) else {
            errors.push(ValidationError::UnknownTable {
                context: "selected column",
                table_id: selected.table_id.clone(),
            });
            continue;
        };
        let Some(column) = relation.column(&selected.column_id) else {
            errors.push(ValidationError::UnknownColumn {
                context: "selected column",
                table_id: selected.table_id.clone(),
                column_id: selected.column_id.clone(),
            });
            continue;
        };

        // Formatting tag must match the column's type, except `none`.
        if let Some(formatting) = &selected.formatting {
            if !formatting.matches(column.column_type) {
                if let Some(formatting_type) = formatting.column_type() {
                    errors.push(ValidationError::FormattingMismatch {
                        column_id: selected.column_id.clone(),
                        column_type: column.column_type,
                        formatting_type,
                    });
                }
            }
        }
    }
}

fn validate_filters(
    source: &DataSource,
    report: &ReportConfig,
    errors: &mut Vec<ValidationError>,
) {
    for filter in &report.filters {
        let Some(relation) = source.table_or_view(&filter.table_id) else {
            errors.push(ValidationError::UnknownTable {
                context: "filter",
                table_id: filter.table_id.clone(),
            });
            continue;
        };
        let Some(column) = relation.column(&filter.column_id) else {
            errors.push(ValidationError::UnknownColumn {
                context: "filter",
                table_id: filter.table_id.clone(),
                column_id: filter.column_id.clone(),
            });
            continue;
        };

        if !operators::is_legal(filter.operator, column.column_type) {
            errors.push(ValidationError::IllegalOperator {
                column_id: filter.column_id.clone(),
                column_type: column.column_type,
                operator: filter.operator,
            });
        }
        if filter.operator.needs_value_input() && filter.value.trim().is_empty() {
            errors.push(ValidationError::MissingValue {
                column_id: filter.column_id.clone(),
                operator: filter.operator,
            });
        }
        if filter.operator.needs_two_values()
            && filter.value2.as_deref().map_or(true, |v| v.trim().is_empty())
        {
            errors.push(ValidationError::MissingSecondValue {
                column_id: filter.column_id.clone(),
            });
        }
    }
}

fn validate_sorts(source: &DataSource, report: &ReportConfig, errors: &mut Vec<ValidationError>) {
    for sort in &report.sorts {
        let Some(relation) = source.table_or_view(&sort.table_id) else {
            errors.push(ValidationError::UnknownTable {
                context: "sort",
                table_id: sort.table_id.clone(),
            });
            continue;
        };
        if relation.column(&sort.column_id).is_none() {
            errors.push(ValidationError::UnknownColumn {
                context: "sort",
                table_id: sort.table_id.clone(),
                column_id: sort.column_id.clone(),
            });
        }
    }
}
