//! Two-attempt endpoint fallback
//!
//! Bridges API versions: when the primary call fails with one of the trigger
//! statuses, the alternate is tried exactly once. No loop, no backoff.

use tracing::info;
use wm_types::ApiError;

/// Validation-shaped rejections of the primary endpoint
pub const ON_VALIDATION: &[u16] = &[422];
/// Bad request or validation on query-parameter renames
pub const ON_BAD_QUERY: &[u16] = &[400, 422];
/// The primary endpoint is missing or refuses this key
pub const ON_UNAVAILABLE: &[u16] = &[401, 403, 404, 405];

pub fn with_fallback<T, P, A>(triggers: &[u16], primary: P, alternate: A) -> Result<T, ApiError>
where
    P: FnOnce() -> Result<T, ApiError>,
    A: FnOnce() -> Result<T, ApiError>,
{
    match primary() {
        Err(err) if triggers.contains(&err.code) => {
            info!("primary endpoint returned {}, trying fallback", err.code);
            alternate()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_success_skips_alternate() {
        let alt_calls = Cell::new(0);
        let out = with_fallback(ON_VALIDATION, || Ok(1), || {
            alt_calls.set(alt_calls.get() + 1);
            Ok(2)
        });
        assert_eq!(out.unwrap(), 1);
        assert_eq!(alt_calls.get(), 0);
    }

    #[test]
    fn test_trigger_runs_alternate_once() {
        let alt_calls = Cell::new(0);
        let out: Result<i32, ApiError> = with_fallback(
            ON_UNAVAILABLE,
            || Err(ApiError::new("nope", 405)),
            || {
                alt_calls.set(alt_calls.get() + 1);
                Err(ApiError::new("still nope", 500))
            },
        );
        assert_eq!(out.unwrap_err().code, 500);
        assert_eq!(alt_calls.get(), 1);
    }

    #[test]
    fn test_other_errors_pass_through() {
        let out: Result<i32, ApiError> =
            with_fallback(ON_VALIDATION, || Err(ApiError::new("boom", 500)), || Ok(2));
        assert_eq!(out.unwrap_err().message, "boom");
    }
}
