//! Fiat amount to RAI conversion and display formatting

use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

use super::patterns::PATTERNS;
use crate::context::ScanContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    /// Grouped decimal with exactly `decimals` fractional digits
    Amount(String),
    /// Nonzero value too small to show at the configured precision, e.g. `<0.01`
    BelowThreshold(String),
}

impl ConversionResult {
    pub fn as_str(&self) -> &str {
        match self {
            ConversionResult::Amount(text) | ConversionResult::BelowThreshold(text) => text,
        }
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a raw fiat amount such as `1,299.99` into RAI.
///
/// Returns `None` when the text does not parse as a number at all, or when the
/// amount or the quotient falls outside the range of `Decimal` (about ±7.9e28).
pub fn convert(raw_amount: &str, context: &ScanContext) -> Option<ConversionResult> {
    let amount = parse_amount(raw_amount)?;
    let Some(converted) = amount.checked_div(context.conversion_rate()) else {
        warn!(
            "Converted value of {raw_amount:?} at rate {} is out of range",
            context.conversion_rate()
        );
        return None;
    };
    let decimals = context.decimals();
    let threshold = Decimal::new(1, decimals);

    if !converted.is_zero() && converted.abs() < threshold {
        let prefix = if converted.is_sign_negative() { ">-" } else { "<" };
        return Some(ConversionResult::BelowThreshold(format!("{prefix}{threshold}")));
    }

    let rounded = converted.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    Some(ConversionResult::Amount(format_grouped(rounded, decimals)))
}

/// Strip thousands separators and parse
pub fn parse_amount(raw_amount: &str) -> Option<Decimal> {
    let trimmed = raw_amount.trim();
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    match Decimal::from_str(&cleaned) {
        Ok(amount) => Some(amount),
        Err(e) => {
            if PATTERNS.find_amount(trimmed) == Some(trimmed) {
                warn!("Amount {trimmed:?} is too large to convert: {e}");
            }
            None
        }
    }
}

fn format_grouped(value: Decimal, decimals: u32) -> String {
    let digits = value.abs().to_string();
    let (integer, fraction) = digits.split_once('.').unwrap_or((&digits, ""));

    let mut formatted = String::with_capacity(digits.len() + integer.len() / 3 + 2);
    if value.is_sign_negative() && !value.is_zero() {
        formatted.push('-');
    }
    formatted.push_str(&group_thousands(integer));

    if decimals > 0 {
        formatted.push('.');
        formatted.push_str(fraction);
        for _ in fraction.len()..decimals as usize {
            formatted.push('0');
        }
    }
    formatted
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
