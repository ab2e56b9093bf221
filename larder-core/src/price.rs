//! Recipe prices are stored as `numeric(5, 2)`.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer};

use crate::error::PriceError;

pub const DECIMAL_PLACES: i64 = 2;
/// Exclusive upper bound implied by five digits with two after the point.
pub const MAX_PRICE: i32 = 1000;

/// Check a price fits the column and return it at the stored scale.
pub fn validate_price(price: &BigDecimal) -> Result<BigDecimal, PriceError> {
    if *price < BigDecimal::from(0) {
        return Err(PriceError::Negative);
    }

    let (_, scale) = price.normalized().as_bigint_and_exponent();
    if scale > DECIMAL_PLACES {
        return Err(PriceError::TooPrecise);
    }

    if *price >= BigDecimal::from(MAX_PRICE) {
        return Err(PriceError::TooLarge);
    }

    Ok(price.with_scale(DECIMAL_PLACES))
}

/// Parse a price from its text form (`"5.00"`, `"12"`).
pub fn parse_price(raw: &str) -> Result<BigDecimal, PriceError> {
    BigDecimal::from_str(raw.trim()).map_err(|_| PriceError::NotANumber)
}

/// Clients may send prices as JSON numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(serde_json::Number),
}

impl RawPrice {
    fn parse(self) -> Result<BigDecimal, PriceError> {
        match self {
            RawPrice::Text(text) => parse_price(&text),
            RawPrice::Number(number) => parse_price(&number.to_string()),
        }
    }
}

/// `deserialize_with` helper for required price fields.
pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    RawPrice::deserialize(deserializer)?
        .parse()
        .map_err(serde::de::Error::custom)
}

/// `deserialize_with` helper for optional price fields. Pair with `#[serde(default)]`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawPrice>::deserialize(deserializer)?
        .map(RawPrice::parse)
        .transpose()
        .map_err(serde::de::Error::custom)
}
