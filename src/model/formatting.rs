//! Column display-formatting configuration.
//!
//! [`FormattingConfig`] is a tagged union with one variant per column type;
//! each variant carries a distinct payload struct so a date-shaped config can
//! never decorate a `number` tag. On the wire it serializes as
//! `{"type": "...", "config": {...}}`.

use serde::{Deserialize, Serialize};

use super::datasource::ColumnType;

/// Date rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateStyle {
    #[default]
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    #[serde(rename = "YYYY-MM-DD")]
    IsoDate,
    #[serde(rename = "MMM DD, YYYY")]
    AbbreviatedMonth,
    #[serde(rename = "MMMM DD, YYYY")]
    FullMonth,
    /// Rendered with the locale-default long form; relative rendering needs
    /// a clock and the formatting engine stays pure.
    #[serde(rename = "relative")]
    Relative,
    #[serde(rename = "iso")]
    IsoTimestamp,
}

/// Formatting payload for date columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateFormatting {
    pub format: DateStyle,
}

/// Formatting payload for number columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormatting {
    pub decimal_places: u32,
    pub thousand_separator: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// Where a currency symbol sits relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

/// Formatting payload for currency columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormatting {
    pub symbol: String,
    pub decimal_places: u32,
    pub thousand_separator: bool,
    pub symbol_position: SymbolPosition,
}

/// Boolean rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BooleanStyle {
    #[default]
    #[serde(rename = "true/false")]
    TrueFalse,
    #[serde(rename = "yes/no")]
    YesNo,
    #[serde(rename = "1/0")]
    OneZero,
    #[serde(rename = "check/x")]
    CheckCross,
}

impl BooleanStyle {
    /// Parse a style from its wire name. Unrecognized styles fall back to
    /// true/false.
    pub fn parse(s: &str) -> Self {
        match s {
            "yes/no" => BooleanStyle::YesNo,
            "1/0" => BooleanStyle::OneZero,
            "check/x" => BooleanStyle::CheckCross,
            _ => BooleanStyle::TrueFalse,
        }
    }
}

// Hand-rolled so unknown wire styles degrade to true/false instead of
// failing the whole report deserialization.
impl<'de> Deserialize<'de> for BooleanStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(BooleanStyle::parse(&raw))
    }
}

/// Formatting payload for boolean columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BooleanFormatting {
    pub style: BooleanStyle,
}

/// Case transform for string columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringCase {
    Uppercase,
    Lowercase,
    /// Uppercase the first letter, leave the rest untouched.
    Capitalize,
    #[default]
    None,
}

/// Formatting payload for string columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringFormatting {
    #[serde(default)]
    pub case: StringCase,
    /// Maximum rendered length in characters, applied after the case
    /// transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate: Option<usize>,
}

/// Display formatting attached to a report column.
///
/// The tag must match the type of the column it decorates, except `none`
/// (enforced by [`crate::validation`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "lowercase")]
pub enum FormattingConfig {
    Date(DateFormatting),
    Number(NumberFormatting),
    Currency(CurrencyFormatting),
    Boolean(BooleanFormatting),
    String(StringFormatting),
    None,
}

impl FormattingConfig {
    /// The column type this config is shaped for; `None` for the untyped
    /// `none` variant.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            FormattingConfig::Date(_) => Some(ColumnType::Date),
            FormattingConfig::Number(_) => Some(ColumnType::Number),
            FormattingConfig::Currency(_) => Some(ColumnType::Currency),
            FormattingConfig::Boolean(_) => Some(ColumnType::Boolean),
            FormattingConfig::String(_) => Some(ColumnType::String),
            FormattingConfig::None => None,
        }
    }

    /// Whether this config may decorate a column of `column_type`.
    pub fn matches(&self, column_type: ColumnType) -> bool {
        self.column_type().map_or(true, |t| t == column_type)
    }
}
