//! Which API key a request path gets
//!
//! A convenience heuristic for the console, not an authorization model.

/// Key scope implied by a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyScope {
    pub driver: bool,
    pub admin: bool,
}

const DRIVER_PREFIXES: &[&str] = &["/driver"];
const DRIVER_MARKERS: &[&str] = &["/ensure-skip"];
const ADMIN_PREFIXES: &[&str] = &["/admin", "/skips/_seed", "/__debug"];

pub fn key_scope(path: &str) -> KeyScope {
    let path = path.to_lowercase();
    KeyScope {
        driver: DRIVER_PREFIXES.iter().any(|p| path.starts_with(p))
            || DRIVER_MARKERS.iter().any(|m| path.contains(m)),
        admin: ADMIN_PREFIXES.iter().any(|p| path.starts_with(p)),
    }
}

/// Pick the key for `path`. The admin key wins when both scopes match;
/// empty keys are never chosen.
pub fn select_key<'a>(
    path: &str,
    driver_key: Option<&'a str>,
    admin_key: Option<&'a str>,
) -> Option<&'a str> {
    let scope = key_scope(path);
    let usable = |k: Option<&'a str>| k.filter(|k| !k.trim().is_empty());

    let mut chosen = None;
    if scope.driver {
        chosen = usable(driver_key).or(chosen);
    }
    if scope.admin {
        chosen = usable(admin_key).or(chosen);
    }
    chosen
}
