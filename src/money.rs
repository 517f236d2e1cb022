//! Money at the API boundary.
//!
//! Amounts are `Decimal` internally and travel as two-decimal strings
//! (`"1250.00"`) so clients never see binary floating point. Incoming
//! amounts may be strings or JSON numbers.

use crate::errors::ServiceError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{de, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

/// Largest amount a `DECIMAL(16, 4)` money column holds, kept to cents.
pub const MAX_AMOUNT: Decimal = dec!(999999999999.99);

/// Passes `amount` through when a money column can store it.
pub fn ensure_storable(field: &str, amount: Decimal) -> Result<Decimal, ServiceError> {
    if amount > MAX_AMOUNT {
        return Err(ServiceError::BadRequest(format!(
            "{} must not exceed {}",
            field,
            format(&MAX_AMOUNT)
        )));
    }
    Ok(amount)
}

/// Rounds half away from zero to cents.
pub fn to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

pub fn format(amount: &Decimal) -> String {
    to_cents(*amount).to_string()
}

pub fn serialize<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(amount))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    RawAmount::deserialize(deserializer)?
        .into_decimal()
        .map_err(de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Int(i64),
    Float(f64),
}

impl RawAmount {
    fn into_decimal(self) -> Result<Decimal, String> {
        match self {
            RawAmount::Text(s) => Decimal::from_str(s.trim())
                .map_err(|e| format!("invalid decimal amount '{}': {}", s, e)),
            RawAmount::Int(i) => Ok(Decimal::from(i)),
            // shortest round-trip repr keeps 45.5 as 45.5
            RawAmount::Float(f) if f.is_finite() => Decimal::from_str(&f.to_string())
                .map_err(|e| format!("invalid decimal amount {}: {}", f, e)),
            RawAmount::Float(f) => Err(format!("invalid decimal amount {}", f)),
        }
    }
}

/// Same encoding for optional amounts.
pub mod option {
    use super::RawAmount;
    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match amount {
            Some(value) => serializer.serialize_str(&super::format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawAmount>::deserialize(deserializer)?
            .map(|raw| raw.into_decimal().map_err(de::Error::custom))
            .transpose()
    }
}

/// Fractional rates such as deposit percentages: up to four places, no padding.
pub mod rate {
    use super::RawAmount;
    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(rate: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&rate.round_dp(4).normalize().to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawAmount::deserialize(deserializer)?
            .into_decimal()
            .map_err(de::Error::custom)
    }
}
