//! Integration tests for report validation.

use gridline::model::{
    ColumnDef, ColumnType, DataSource, DataSourceKind, DateFormatting, FilterCondition,
    FilterOperator, FormattingConfig, ReportColumn, ReportConfig, SortCondition, SortDirection,
    TableDef,
};
use gridline::validation::{validate_report, ValidationError};

fn sample_source() -> DataSource {
    let mut source = DataSource::new("ds-1", "Warehouse", DataSourceKind::Postgres);
    source.tables = vec![TableDef::new(
        "t-orders",
        "orders",
        vec![
            ColumnDef::new("c-amount", "amount", ColumnType::Number),
            ColumnDef::new("c-region", "region", ColumnType::String),
            ColumnDef::new("c-placed", "placed_at", ColumnType::Date),
        ],
    )
    .expose()];
    source
}

fn valid_report() -> ReportConfig {
    let mut report = ReportConfig::new("user-1");
    report.data_source_id = "ds-1".to_string();
    report.selected_columns = vec![
        ReportColumn::new("t-orders", "c-amount"),
        ReportColumn::new("t-orders", "c-region"),
    ];
    report.filters = vec![FilterCondition {
        id: "f-1".to_string(),
        table_id: "t-orders".to_string(),
        column_id: "c-region".to_string(),
        operator: FilterOperator::Contains,
        value: "north".to_string(),
        value2: None,
    }];
    report.sorts = vec![SortCondition {
        table_id: "t-orders".to_string(),
        column_id: "c-amount".to_string(),
        direction: SortDirection::Desc,
    }];
    report
}

#[test]
fn test_a_consistent_report_validates() {
    let source = sample_source();
    let report = valid_report();
    assert_eq!(validate_report(&source, &report), Ok(()));
}

#[test]
fn test_empty_selection_is_reported() {
    let source = sample_source();
    let mut report = valid_report();
    report.selected_columns.clear();

    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors.contains(&ValidationError::NoColumnsSelected));
}

#[test]
fn test_duplicate_selections_are_reported() {
    let source = sample_source();
    let mut report = valid_report();
    report
        .selected_columns
        .push(ReportColumn::new("t-orders", "c-amount"));

    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::DuplicateColumn { column_id, .. } if column_id == "c-amount"
    )));
}

#[test]
fn test_cross_table_references_are_reported() {
    let mut source = sample_source();
    source.tables.push(
        TableDef::new(
            "t-other",
            "other",
            vec![ColumnDef::new("c-x", "x", ColumnType::String)],
        )
        .expose(),
    );
    let mut report = valid_report();
    report
        .selected_columns
        .push(ReportColumn::new("t-other", "c-x"));

    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::MultipleTables { count: 2 })));
}

#[test]
fn test_dangling_references_are_reported() {
    let source = sample_source();
    let mut report = valid_report();
    report.selected_columns[0].column_id = "c-gone".to_string();
    report.filters[0].table_id = "t-gone".to_string();
    report.sorts[0].column_id = "c-gone".to_string();

    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::UnknownColumn { context: "selected column", .. }
    )));
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::UnknownTable { context: "filter", .. }
    )));
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::UnknownColumn { context: "sort", .. }
    )));
}

#[test]
fn test_operators_illegal_for_the_column_type_are_reported() {
    let source = sample_source();
    let mut report = valid_report();
    // contains is a string operator; c-amount is a number column
    report.filters[0].column_id = "c-amount".to_string();

    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::IllegalOperator {
            operator: FilterOperator::Contains,
            column_type: ColumnType::Number,
            ..
        }
    )));
}

#[test]
fn test_operator_arity_drives_required_values() {
    let source = sample_source();

    // a value-taking operator with no value
    let mut report = valid_report();
    report.filters[0].value = "  ".to_string();
    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::MissingValue { .. })));

    // a zero-value operator with no value is fine
    let mut report = valid_report();
    report.filters[0].operator = FilterOperator::IsEmpty;
    report.filters[0].value = String::new();
    assert_eq!(validate_report(&source, &report), Ok(()));

    // between needs the second bound
    let mut report = valid_report();
    report.filters[0].column_id = "c-amount".to_string();
    report.filters[0].operator = FilterOperator::Between;
    report.filters[0].value = "10".to_string();
    report.filters[0].value2 = None;
    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::MissingSecondValue { .. })));

    // and validates once both bounds are present
    let mut report = valid_report();
    report.filters[0].column_id = "c-amount".to_string();
    report.filters[0].operator = FilterOperator::Between;
    report.filters[0].value = "10".to_string();
    report.filters[0].value2 = Some("20".to_string());
    assert_eq!(validate_report(&source, &report), Ok(()));
}

#[test]
fn test_formatting_tag_must_match_the_column_type() {
    let source = sample_source();
    let mut report = valid_report();
    report.selected_columns[0].formatting =
        Some(FormattingConfig::Date(DateFormatting::default()));

    let errors = validate_report(&source, &report).expect_err("must fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::FormattingMismatch {
            column_type: ColumnType::Number,
            formatting_type: ColumnType::Date,
            ..
        }
    )));

    // the untyped `none` variant decorates anything
    let mut report = valid_report();
    report.selected_columns[0].formatting = Some(FormattingConfig::None);
    assert_eq!(validate_report(&source, &report), Ok(()));
}
