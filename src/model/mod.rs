//! Report and data-source model types.
//!
//! These types are the wire form shared with collaborators: field names
//! follow the JSON casing the catalog, persistence, and query services use.

pub mod datasource;
pub mod formatting;
pub mod report;
pub mod user;

pub use datasource::{
    ColumnDef, ColumnType, ConnectionDetails, ConstraintDef, ConstraintKind, DataSource,
    DataSourceKind, ForeignKey, IndexDef, Relation, TableDef, ViewDef,
};
pub use formatting::{
    BooleanFormatting, BooleanStyle, CurrencyFormatting, DateFormatting, DateStyle,
    FormattingConfig, NumberFormatting, StringCase, StringFormatting, SymbolPosition,
};
pub use report::{
    Aggregation, FilterCondition, FilterOperator, ReportColumn, ReportConfig, ScheduleConfig,
    ScheduleFrequency, SortCondition, SortDirection, Visibility, VisualizationType,
};
pub use user::User;
