/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

/// Parses a raw setting or returns a default value if absent or unparseable
///
/// # Arguments
///
/// * `name` - Name of the setting, used in the log line on parse failure
/// * `raw` - Raw value, if the setting is present
/// * `default` - The value to use when `raw` is absent or cannot be parsed
pub fn parse_or_default<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match raw {
        Some(val) => val.trim().parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", name, val);
            default
        }),
        None => default,
    }
}

/// Parses an optional raw setting; absent or unparseable values are `None`
///
/// An unparseable value is logged the same way as in [`parse_or_default`].
pub fn parse_or_none<T: FromStr>(name: &str, raw: Option<String>) -> Option<T>
where
    <T as FromStr>::Err: Debug,
{
    let val = raw?;
    match val.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            error!("Failed to parse {}: {}, ignoring it", name, val);
            None
        }
    }
}

/// Returns the trimmed value if present and not blank
pub fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
