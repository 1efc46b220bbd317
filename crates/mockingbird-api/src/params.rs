//! Typed readers over the flat request parameter map.
//!
//! Parameters arrive as strings, either decoded from a query string or
//! supplied as an explicit body map. Each reader returns `None` for an
//! absent parameter (handlers apply the documented default) and
//! [`ServiceError::InvalidParameter`] for a value that does not parse.

use std::collections::HashMap;

use mockingbird_core::entity::{MessageId, UserId};
use mockingbird_core::error::ServiceError;

/// Flat request parameter map.
pub type ParamMap = HashMap<String, String>;

/// The raw value of a parameter, if supplied.
pub fn opt_str<'a>(params: &'a ParamMap, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

/// The raw value of a required parameter.
pub fn require<'a>(params: &'a ParamMap, name: &str) -> Result<&'a str, ServiceError> {
    opt_str(params, name).ok_or_else(|| ServiceError::MissingParameter { name: name.to_owned() })
}

fn invalid(name: &str, value: &str) -> ServiceError {
    ServiceError::InvalidParameter { name: name.to_owned(), value: value.to_owned() }
}

/// Optional boolean parameter. Accepts `true/false/t/f/1/0`, case
/// insensitive.
pub fn opt_bool(params: &ParamMap, name: &str) -> Result<Option<bool>, ServiceError> {
    match opt_str(params, name) {
        None => Ok(None),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(Some(true)),
            "false" | "f" | "0" => Ok(Some(false)),
            _ => Err(invalid(name, raw)),
        },
    }
}

/// Optional numeric parameter.
pub fn opt_u64(params: &ParamMap, name: &str) -> Result<Option<u64>, ServiceError> {
    match opt_str(params, name) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| invalid(name, raw)),
    }
}

/// Optional count parameter.
pub fn opt_usize(params: &ParamMap, name: &str) -> Result<Option<usize>, ServiceError> {
    match opt_str(params, name) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| invalid(name, raw)),
    }
}

/// Optional user identifier parameter.
pub fn opt_user_id(params: &ParamMap, name: &str) -> Result<Option<UserId>, ServiceError> {
    Ok(opt_u64(params, name)?.map(UserId))
}

/// Optional message identifier parameter.
pub fn opt_message_id(params: &ParamMap, name: &str) -> Result<Option<MessageId>, ServiceError> {
    Ok(opt_u64(params, name)?.map(MessageId))
}

/// Required message identifier parameter.
pub fn require_message_id(params: &ParamMap, name: &str) -> Result<MessageId, ServiceError> {
    let raw = require(params, name)?;
    raw.parse().map(MessageId).map_err(|_| invalid(name, raw))
}

/// Comma-separated list of user identifiers.
pub fn opt_user_id_list(params: &ParamMap, name: &str) -> Result<Vec<UserId>, ServiceError> {
    let Some(raw) = opt_str(params, name) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|part| !part.is_empty())
        .map(|part| part.trim().parse().map(UserId).map_err(|_| invalid(name, raw)))
        .collect()
}

/// Comma-separated list of track terms.
pub fn opt_term_list(params: &ParamMap, name: &str) -> Vec<String> {
    let Some(raw) = opt_str(params, name) else {
        return Vec::new();
    };
    raw.split(',').filter(|part| !part.is_empty()).map(str::to_owned).collect()
}
