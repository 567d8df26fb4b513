use crate::error::Error;

/// Resolves the `limit` query parameter of a list endpoint.
///
/// Absent means `default`; anything outside `1..=max` is rejected.
pub fn resolve_limit(requested: Option<u64>, default: u64, max: u64) -> Result<usize, Error> {
    let limit = requested.unwrap_or(default);

    if limit == 0 || limit > max {
        return Err(Error::bad_request(format!(
            "limit must be between 1 and {max}"
        )));
    }

    Ok(limit as usize)
}
