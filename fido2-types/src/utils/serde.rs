//! Utilities to be used in serde derives for more robust (de)serializations.

use serde::{Deserialize, Deserializer};


/// Many fields in the webauthn spec have the following wording.
///
/// > The values SHOULD be members of `T` but client platforms MUST ignore unknown values.
///
/// This method is a simple way of ignoring unknown values without failing deserialization.
pub(crate) fn ignore_unknown<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(T::deserialize(de).unwrap_or_default())
}

/// Same as [`ignore_unknown`] but for lists, where only the unknown entries are dropped.
pub(crate) fn ignore_unknown_opt_vec<'de, D, T>(de: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let values: Option<Vec<serde_json::Value>> = Option::deserialize(de)?;
    Ok(values.map(|values| {
        values
            .into_iter()
            .filter_map(|value| T::deserialize(value).ok())
            .collect()
    }))
}

/// Relying parties are not consistent in how they send numbers, some send `60000`, others
/// `"60000"` or `60000.0`. All of them are accepted, anything else is treated as absent.
pub(crate) fn maybe_stringified<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(de)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(num) => num
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| num.as_f64().and_then(float_to_u32)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u32>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().and_then(float_to_u32)),
        _ => None,
    }))
}

#[allow(clippy::as_conversions)]
fn float_to_u32(f: f64) -> Option<u32> {
    if !f.is_finite() || f < 0.0 {
        return None;
    }
    // float to int casts truncate toward zero and saturate at u32::MAX
    Some(f as u32)
}
