//! Parsing for list-endpoint query parameters.
//!
//! Values arrive as raw strings so that malformed input can be reported as a
//! validation error instead of a generic extractor rejection.

use crate::error::FilterError;

/// Parse a comma-separated id list such as `"3,1,2"`.
///
/// Returns the ids sorted and de-duplicated. An empty (or all-whitespace)
/// value yields an empty list, which callers treat as "no filter".
pub fn parse_id_list(param: &'static str, raw: &str) -> Result<Vec<i32>, FilterError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut ids = raw
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| FilterError::InvalidId {
                    param,
                    value: part.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Parse an integer flag: `0` is off, any other integer is on.
pub fn parse_flag(param: &'static str, raw: &str) -> Result<bool, FilterError> {
    raw.trim()
        .parse::<i64>()
        .map(|value| value != 0)
        .map_err(|_| FilterError::InvalidFlag {
            param,
            value: raw.to_string(),
        })
}
