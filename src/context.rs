//! Inbound preference updates and the validated scan context
//!
//! The preferences collaborator sends a full `Preferences` object every time
//! the user changes a setting or a fresh conversion rate arrives. The engine
//! only ever reads a `ScanContext` derived from it; a new message replaces the
//! previous context wholesale.

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

pub const MIN_DECIMALS: u32 = 0;
pub const MAX_DECIMALS: u32 = 18;
pub const MIN_REFRESH_SECS: u64 = 3;
pub const MAX_REFRESH_SECS: u64 = 3600;

/// Where the collaborator reads the RAI/USD rate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    /// Last redemption price published by the protocol
    Redemption,
    /// Spot market price
    Market,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(deserialize_with = "number_or_string")]
    pub decimals: u32,
    #[serde(deserialize_with = "number_or_string")]
    pub refresh_conversion_time: u64,
    pub enabled: bool,
    pub market_price: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<Decimal>,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            decimals: 2,
            refresh_conversion_time: 300,
            enabled: true,
            market_price: false,
            conversion: None,
        }
    }
}

impl Preferences {
    /// Parse a preferences message as sent by the relay
    pub fn from_json(message: &str) -> Result<Self> {
        Ok(serde_json::from_str(message)?)
    }

    /// Clamp user-editable fields into the ranges the settings UI allows
    pub fn clamped(mut self) -> Self {
        self.decimals = self.decimals.clamp(MIN_DECIMALS, MAX_DECIMALS);
        self.refresh_conversion_time = self
            .refresh_conversion_time
            .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
        self
    }

    pub fn rate_source(&self) -> RateSource {
        if self.market_price {
            RateSource::Market
        } else {
            RateSource::Redemption
        }
    }
}

/// Settings forms send numeric fields as strings, e.g. `"decimals": "4"`
fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<V> {
        Number(V),
        Text(String),
    }

    match Field::<T>::deserialize(deserializer)? {
        Field::Number(value) => Ok(value),
        Field::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

/// Read-only snapshot every scan works against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanContext {
    decimals: u32,
    conversion_rate: Decimal,
    enabled: bool,
}

impl ScanContext {
    pub fn new(decimals: u32, conversion_rate: Decimal, enabled: bool) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            return Err(Error::DecimalsOutOfRange {
                got: decimals,
                max: MAX_DECIMALS,
            });
        }
        if conversion_rate <= Decimal::ZERO {
            return Err(Error::InvalidRate(conversion_rate));
        }

        Ok(ScanContext {
            decimals,
            conversion_rate,
            enabled,
        })
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Fiat amount worth one RAI; always strictly positive
    pub fn conversion_rate(&self) -> Decimal {
        self.conversion_rate
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl TryFrom<&Preferences> for ScanContext {
    type Error = Error;

    fn try_from(prefs: &Preferences) -> Result<Self> {
        let rate = prefs.conversion.ok_or(Error::MissingRate)?;
        ScanContext::new(prefs.decimals, rate, prefs.enabled)
    }
}
