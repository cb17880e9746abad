//! Turns raw provider periods into [`StatementRecord`]s.
//!
//! The provider reports camelCase fields, numbers that are sometimes strings,
//! and metadata columns mixed in with the line items. Normalization maps the
//! field names to stable snake_case keys, coerces values to finite f64, and
//! skips records that cannot be keyed rather than failing the whole batch.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::domain::{now_rfc3339, FiscalPeriod, StatementRecord, StatementType, Symbol};
use crate::source::RawPeriod;

/// Provider fields that are metadata rather than line items.
const SKIP_FIELDS: &[&str] = &[
    "acceptedDate",
    "calendarYear",
    "cik",
    "date",
    "fillingDate",
    "finalLink",
    "ipoDate",
    "link",
    "period",
    "reportedCurrency",
    "symbol",
];

/// Provider field names that get a stable spelling instead of the mechanical
/// camelCase conversion.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("ebitdaratio", "ebitda_ratio"),
    ("epsdiluted", "eps_diluted"),
    ("epsgrowth", "eps_growth"),
    ("grossProfitRatio", "gross_margin"),
    ("netIncomeRatio", "net_margin"),
    ("operatingIncomeRatio", "operating_margin"),
];

/// Why a raw period was skipped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    MissingPeriodField,
    InvalidPeriodDate,
    SymbolMismatch,
    NoLineItems,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingPeriodField => "the period field is missing or not a string",
            Self::InvalidPeriodDate => "the period field is not a valid calendar date",
            Self::SymbolMismatch => "the record reports a different ticker",
            Self::NoLineItems => "no numeric line items survived coercion",
        };
        f.write_str(text)
    }
}

/// A raw period that could not be normalized, with its position in the
/// provider payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub symbol: Symbol,
    pub statement: StatementType,
    pub index: usize,
    pub reason: MalformedReason,
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} record #{}: {}",
            self.symbol, self.statement, self.index, self.reason
        )
    }
}

/// The outcome of normalizing one provider payload: the usable records plus
/// everything that had to be skipped.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<StatementRecord>,
    pub skipped: Vec<MalformedRecord>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a full payload for one (ticker, statement type) fetch.
    /// Malformed periods are collected, logged, and skipped; they never abort
    /// the rest of the payload.
    pub fn normalize(
        &self,
        symbol: &Symbol,
        statement: StatementType,
        raw: Vec<RawPeriod>,
    ) -> NormalizedBatch {
        let fetched_at = now_rfc3339();
        let mut batch = NormalizedBatch::default();

        for (index, period) in raw.into_iter().enumerate() {
            match self.normalize_one(symbol, statement, &period, &fetched_at) {
                Ok(record) => batch.records.push(record),
                Err(reason) => {
                    let malformed = MalformedRecord {
                        symbol: symbol.clone(),
                        statement,
                        index,
                        reason,
                    };
                    log::warn!("skipping malformed record: {malformed}");
                    batch.skipped.push(malformed);
                }
            }
        }

        batch
    }

    fn normalize_one(
        &self,
        symbol: &Symbol,
        statement: StatementType,
        period: &RawPeriod,
        fetched_at: &str,
    ) -> Result<StatementRecord, MalformedReason> {
        if let Some(reported) = period.get("symbol").and_then(Value::as_str) {
            if !reported.trim().eq_ignore_ascii_case(symbol.as_str()) {
                return Err(MalformedReason::SymbolMismatch);
            }
        }

        let period_text = period
            .get(statement.period_field())
            .and_then(Value::as_str)
            .ok_or(MalformedReason::MissingPeriodField)?;
        let fiscal_period =
            FiscalPeriod::parse(period_text).map_err(|_| MalformedReason::InvalidPeriodDate)?;

        let currency = period
            .get("reportedCurrency")
            .or_else(|| period.get("currency"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut line_items = BTreeMap::new();
        for (field, value) in period {
            if SKIP_FIELDS.contains(&field.as_str()) {
                continue;
            }
            if let Some(number) = coerce_number(value) {
                line_items.insert(canonical_field_name(field), number);
            }
        }
        if line_items.is_empty() {
            return Err(MalformedReason::NoLineItems);
        }

        Ok(StatementRecord {
            symbol: symbol.clone(),
            statement,
            period: fiscal_period,
            currency,
            line_items,
            fetched_at: fetched_at.to_string(),
        })
    }
}

/// Coerce a JSON value to a finite f64. Numeric strings count; nulls,
/// booleans, non-numeric strings and non-finite values do not.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Map a provider field name to its stored key: an explicit alias when one
/// exists, otherwise the camelCase name converted to snake_case.
fn canonical_field_name(field: &str) -> String {
    for (provider, canonical) in FIELD_ALIASES {
        if *provider == field {
            return (*canonical).to_string();
        }
    }
    camel_to_snake(field)
}

fn camel_to_snake(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    let mut previous_lower = false;
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            if previous_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            previous_lower = false;
        } else {
            previous_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}
