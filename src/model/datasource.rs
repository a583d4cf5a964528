//! Schema catalog types: data sources, tables, views, columns.
//!
//! The catalog is read-only from this crate's point of view: it is supplied
//! by the catalog collaborator (live introspection) or by AI schema
//! discovery, and reports are built against it.

use serde::{Deserialize, Serialize};

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Date,
    Boolean,
    Currency,
}

impl ColumnType {
    /// All column types, in catalog display order.
    pub const ALL: [ColumnType; 5] = [
        ColumnType::String,
        ColumnType::Number,
        ColumnType::Date,
        ColumnType::Boolean,
        ColumnType::Currency,
    ];

    /// Parse a column type from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ColumnType::String),
            "number" => Some(ColumnType::Number),
            "date" => Some(ColumnType::Date),
            "boolean" => Some(ColumnType::Boolean),
            "currency" => Some(ColumnType::Currency),
            _ => None,
        }
    }

    /// Wire name of this column type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::Currency => "currency",
        }
    }

    /// Whether values of this type are numeric (number or currency).
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Currency)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column as discovered in a table or view.
///
/// Immutable once discovered; owned by its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Unique within the owning table.
    pub id: String,
    /// Physical column name.
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// User-friendly name, preferred over `name` for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sample data for previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_value: Option<String>,
    /// Personally identifiable information.
    #[serde(default)]
    pub is_pii: bool,
    #[serde(default)]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_unique: bool,
}

impl ColumnDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
            alias: None,
            description: None,
            sample_value: None,
            is_pii: false,
            is_nullable: false,
            is_primary_key: false,
            is_unique: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Display label: alias if present, physical name otherwise.
    pub fn display_label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A foreign key discovered on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub id: String,
    pub name: String,
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

/// An index discovered on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDef {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_primary: bool,
}

/// Kind of a discovered constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    #[serde(rename = "UNIQUE")]
    Unique,
    #[serde(rename = "CHECK")]
    Check,
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
    #[serde(rename = "DEFAULT")]
    Default,
}

/// A constraint discovered on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintDef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// A physical table in a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDef {
    pub id: String,
    /// Physical table name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Column IDs are unique within the table.
    pub columns: Vec<ColumnDef>,
    /// Admin gate: only exposed tables are selectable when building a report.
    #[serde(default)]
    pub exposed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDef>,
}

impl TableDef {
    /// A table with no discovered metadata, unexposed until an admin flips
    /// the gate.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alias: None,
            description: None,
            columns,
            exposed: false,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn expose(mut self) -> Self {
        self.exposed = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A view in a data source.
///
/// Structurally a table with a source query attached; tables and views are
/// equals when resolving report columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<ColumnDef>,
    /// Source query of the view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub exposed: bool,
}

impl ViewDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alias: None,
            description: None,
            columns,
            definition: None,
            exposed: false,
        }
    }

    pub fn expose(mut self) -> Self {
        self.exposed = true;
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }
}

/// Database connection parameters for live data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDetails {
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Kind of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Postgres,
    MySql,
    Snowflake,
    Sql,
    Custom,
}

impl DataSourceKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Postgres => "postgres",
            DataSourceKind::MySql => "mysql",
            DataSourceKind::Snowflake => "snowflake",
            DataSourceKind::Sql => "sql",
            DataSourceKind::Custom => "custom",
        }
    }

    /// Custom sources have no connection and are served by AI generation.
    pub fn is_generated(&self) -> bool {
        matches!(self, DataSourceKind::Custom)
    }
}

/// A data source: a set of tables and views reports can be built against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    /// Absent for `custom` sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_details: Option<ConnectionDetails>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
    #[serde(default)]
    pub views: Vec<ViewDef>,
    #[serde(default, rename = "created_at")]
    pub created_at: String,
}

impl DataSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DataSourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
            connection_details: None,
            tables: Vec::new(),
            views: Vec::new(),
            created_at: String::new(),
        }
    }

    /// Look up a table or view by ID. Tables and views share an ID
    /// namespace; tables are searched first.
    pub fn table_or_view(&self, id: &str) -> Option<Relation<'_>> {
        self.tables
            .iter()
            .find(|t| t.id == id)
            .map(Relation::Table)
            .or_else(|| self.views.iter().find(|v| v.id == id).map(Relation::View))
    }

    /// All tables and views, tables first.
    pub fn relations(&self) -> impl Iterator<Item = Relation<'_>> {
        self.tables
            .iter()
            .map(Relation::Table)
            .chain(self.views.iter().map(Relation::View))
    }

    /// Tables and views selectable by report authors.
    pub fn exposed_relations(&self) -> impl Iterator<Item = Relation<'_>> {
        self.relations().filter(|r| r.exposed())
    }
}

/// A table or view, seen through the reporting surface they share.
#[derive(Debug, Clone, Copy)]
pub enum Relation<'a> {
    Table(&'a TableDef),
    View(&'a ViewDef),
}

impl<'a> Relation<'a> {
    pub fn id(self) -> &'a str {
        match self {
            Relation::Table(t) => &t.id,
            Relation::View(v) => &v.id,
        }
    }

    /// Physical name.
    pub fn name(self) -> &'a str {
        match self {
            Relation::Table(t) => &t.name,
            Relation::View(v) => &v.name,
        }
    }

    pub fn alias(self) -> Option<&'a str> {
        match self {
            Relation::Table(t) => t.alias.as_deref(),
            Relation::View(v) => v.alias.as_deref(),
        }
    }

    /// Display label: alias if present, physical name otherwise.
    pub fn display_label(self) -> &'a str {
        self.alias().unwrap_or_else(|| self.name())
    }

    pub fn columns(self) -> &'a [ColumnDef] {
        match self {
            Relation::Table(t) => &t.columns,
            Relation::View(v) => &v.columns,
        }
    }

    pub fn exposed(self) -> bool {
        match self {
            Relation::Table(t) => t.exposed,
            Relation::View(v) => v.exposed,
        }
    }

    pub fn is_view(self) -> bool {
        matches!(self, Relation::View(_))
    }

    /// Resolve a column by ID, falling back to name-based lookup.
    pub fn column(self, column_id: &str) -> Option<&'a ColumnDef> {
        self.columns()
            .iter()
            .find(|c| c.id == column_id || c.name == column_id)
    }
}
