//! Column formatting engine.
//!
//! [`render`] is the single code path for turning a raw cell value into its
//! display string; on-screen tables and spreadsheet export both go through
//! it, so the two can never diverge.
//!
//! Rendering never fails: null becomes the empty string, and values that do
//! not fit their formatting (unparsable dates, non-numeric input to numeric
//! formats) fall back to their literal string form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::Value;

use crate::model::{
    BooleanFormatting, BooleanStyle, ColumnType, CurrencyFormatting, DateFormatting, DateStyle,
    FormattingConfig, NumberFormatting, StringCase, StringFormatting, SymbolPosition,
};

/// Default formatting for a column type.
pub fn default_formatting(column_type: ColumnType) -> FormattingConfig {
    match column_type {
        ColumnType::Date => FormattingConfig::Date(DateFormatting {
            format: DateStyle::MonthDayYear,
        }),
        ColumnType::Number => FormattingConfig::Number(NumberFormatting {
            decimal_places: 2,
            thousand_separator: true,
            prefix: None,
            suffix: None,
        }),
        ColumnType::Currency => FormattingConfig::Currency(CurrencyFormatting {
            symbol: "$".to_string(),
            decimal_places: 2,
            thousand_separator: true,
            symbol_position: SymbolPosition::Before,
        }),
        ColumnType::Boolean => FormattingConfig::Boolean(BooleanFormatting {
            style: BooleanStyle::TrueFalse,
        }),
        ColumnType::String => FormattingConfig::String(StringFormatting {
            case: StringCase::None,
            truncate: None,
        }),
    }
}

/// Render a raw cell value to its display string.
pub fn render(raw: &Value, formatting: Option<&FormattingConfig>) -> String {
    if raw.is_null() {
        return String::new();
    }
    let Some(formatting) = formatting else {
        return literal(raw);
    };
    match formatting {
        FormattingConfig::Date(f) => render_date(raw, f),
        FormattingConfig::Number(f) => render_number(raw, f),
        FormattingConfig::Currency(f) => render_currency(raw, f),
        FormattingConfig::Boolean(f) => render_boolean(raw, f),
        FormattingConfig::String(f) => render_string(raw, f),
        FormattingConfig::None => literal(raw),
    }
}

/// Literal string form of a value: primitives without quotes, composites as
/// canonical JSON.
pub fn literal(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        composite => composite.to_string(),
    }
}

fn render_date(raw: &Value, formatting: &DateFormatting) -> String {
    let Some(timestamp) = parse_timestamp(raw) else {
        return literal(raw);
    };
    match formatting.format {
        DateStyle::MonthDayYear => timestamp.format("%m/%d/%Y").to_string(),
        DateStyle::DayMonthYear => timestamp.format("%d/%m/%Y").to_string(),
        DateStyle::IsoDate => timestamp.format("%Y-%m-%d").to_string(),
        DateStyle::AbbreviatedMonth => timestamp.format("%b %d, %Y").to_string(),
        DateStyle::FullMonth => timestamp.format("%B %d, %Y").to_string(),
        DateStyle::IsoTimestamp => timestamp
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        DateStyle::Relative => timestamp.format("%b %-d, %Y, %-I:%M %p").to_string(),
    }
}

/// Parse a raw cell as a timestamp: epoch milliseconds, RFC 3339, or the
/// common date/datetime patterns collaborators emit.
fn parse_timestamp(raw: &Value) -> Option<NaiveDateTime> {
    match raw {
        Value::Number(n) => {
            let millis = n.as_f64()? as i64;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            for pattern in ["%Y-%m-%d", "%m/%d/%Y"] {
                if let Ok(date) = NaiveDate::parse_from_str(s, pattern) {
                    return date.and_hms_opt(0, 0, 0);
                }
            }
            None
        }
        _ => None,
    }
}

fn render_number(raw: &Value, formatting: &NumberFormatting) -> String {
    let Some(number) = coerce_number(raw) else {
        return literal(raw);
    };
    let mut rendered = fixed_decimals(number, formatting.decimal_places);
    if formatting.thousand_separator {
        rendered = group_thousands(&rendered);
    }
    format!(
        "{}{}{}",
        formatting.prefix.as_deref().unwrap_or(""),
        rendered,
        formatting.suffix.as_deref().unwrap_or("")
    )
}

fn render_currency(raw: &Value, formatting: &CurrencyFormatting) -> String {
    let Some(number) = coerce_number(raw) else {
        return literal(raw);
    };
    let mut rendered = fixed_decimals(number, formatting.decimal_places);
    if formatting.thousand_separator {
        rendered = group_thousands(&rendered);
    }
    match formatting.symbol_position {
        SymbolPosition::Before => format!("{}{}", formatting.symbol, rendered),
        SymbolPosition::After => format!("{}{}", rendered, formatting.symbol),
    }
}

fn coerce_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        // "inf" and "NaN" parse as floats but are not numbers a report
        // should format
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn fixed_decimals(number: f64, places: u32) -> String {
    format!("{:.*}", places as usize, number)
}

/// Insert `,` every three integer digits, leaving sign and fraction alone.
fn group_thousands(rendered: &str) -> String {
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn render_boolean(raw: &Value, formatting: &BooleanFormatting) -> String {
    let truthy = is_truthy(raw);
    let (yes, no) = match formatting.style {
        BooleanStyle::TrueFalse => ("true", "false"),
        BooleanStyle::YesNo => ("Yes", "No"),
        BooleanStyle::OneZero => ("1", "0"),
        BooleanStyle::CheckCross => ("\u{2713}", "\u{2717}"),
    };
    (if truthy { yes } else { no }).to_string()
}

/// Truthiness of a non-null cell: false, 0, and the empty string are falsy,
/// everything else is truthy.
fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_string(raw: &Value, formatting: &StringFormatting) -> String {
    let rendered = literal(raw);
    let mut rendered = match formatting.case {
        StringCase::Uppercase => rendered.to_uppercase(),
        StringCase::Lowercase => rendered.to_lowercase(),
        StringCase::Capitalize => capitalize_first(&rendered),
        StringCase::None => rendered,
    };
    if let Some(limit) = formatting.truncate {
        if rendered.chars().count() > limit {
            rendered = rendered.chars().take(limit).collect();
        }
    }
    rendered
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
