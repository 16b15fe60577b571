// Client-side checks run before a request is sent
use crate::error::{RdsError, Result};
use std::fmt::Display;
use std::ops::RangeInclusive;

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RdsError::validation(field, "is required"));
    }
    Ok(())
}

/// Length in characters, not bytes.
pub(crate) fn length(field: &str, value: &str, bounds: RangeInclusive<usize>) -> Result<()> {
    let len = value.chars().count();
    if !bounds.contains(&len) {
        return Err(RdsError::validation(
            field,
            format!(
                "length must be between {} and {} characters (got {})",
                bounds.start(),
                bounds.end(),
                len
            ),
        ));
    }
    Ok(())
}

pub(crate) fn optional_length(
    field: &str,
    value: Option<&str>,
    bounds: RangeInclusive<usize>,
) -> Result<()> {
    match value {
        Some(value) => length(field, value, bounds),
        None => Ok(()),
    }
}

pub(crate) fn range<T>(field: &str, value: T, bounds: RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + Display + Copy,
{
    if !bounds.contains(&value) {
        return Err(RdsError::validation(
            field,
            format!(
                "must be between {} and {} (got {})",
                bounds.start(),
                bounds.end(),
                value
            ),
        ));
    }
    Ok(())
}

/// Validate an identifier and encode it for use as a path segment.
pub(crate) fn path_id(field: &str, value: &str) -> Result<String> {
    require(field, value)?;
    Ok(urlencoding::encode(value).into_owned())
}
