use crate::lookup::NAME_PLACEHOLDER;
use kursverwaltung_api_types::parse_calendar_date;
use rust_decimal::Decimal;

/// Format a calendar date (or date-time) as `dd.mm.yyyy`.
///
/// Absent or empty values are shown as placeholder, values which cannot be parsed are shown
/// unchanged.
pub fn format_date(value: Option<&str>) -> String {
    match value.filter(|v| !v.is_empty()) {
        None => NAME_PLACEHOLDER.to_owned(),
        Some(v) => parse_calendar_date(v)
            .map(|date| date.format("%d.%m.%Y").to_string())
            .unwrap_or_else(|| v.to_owned()),
    }
}

pub fn format_period(start: Option<&str>, end: Option<&str>) -> String {
    format!("{} - {}", format_date(start), format_date(end))
}

/// Format a price for a table cell, e.g. `49.90 €`
pub fn format_price(value: Option<Decimal>) -> String {
    match value {
        None => NAME_PLACEHOLDER.to_owned(),
        Some(v) => format!("{:.2} €", v.round_dp(2)),
    }
}

/// Format a sum of money for the statistics, e.g. `49.90 EUR`
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2} EUR", value.round_dp(2))
}

pub fn format_optional_number(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NAME_PLACEHOLDER.to_owned())
}

pub fn format_optional_text(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(NAME_PLACEHOLDER)
        .to_owned()
}

pub fn format_payment_status(bezahlt: bool) -> &'static str {
    if bezahlt {
        "Bezahlt"
    } else {
        "Offen"
    }
}
