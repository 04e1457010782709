//! Resolve free-text driver/vehicle/contractor references to ids
//!
//! Order: id-shaped input as-is, then exact (case-insensitive) name, then
//! prefix, then substring, against the cached list; on a miss the list is
//! fetched once more and matched again. The first hit wins, so two entities
//! sharing a prefix can be confused.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};
use wm_types::ResolveError;

use crate::model::Candidate;
use crate::repository::EntityDirectory;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9a-fA-F-]{20,}$").expect("static pattern"))
}

/// True for UUID-like identifiers
pub fn looks_like_id(s: &str) -> bool {
    id_pattern().is_match(s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Prefix,
    Contains,
}

/// Find the first candidate matching `needle`, trying each tier in turn
pub fn match_candidate<'a>(
    candidates: &'a [Candidate],
    needle: &str,
) -> Option<(&'a Candidate, MatchTier)> {
    let needle = needle.to_lowercase();
    let tiers: [(MatchTier, fn(&str, &str) -> bool); 3] = [
        (MatchTier::Exact, |name, n| name == n),
        (MatchTier::Prefix, |name, n| name.starts_with(n)),
        (MatchTier::Contains, |name, n| name.contains(n)),
    ];

    for (tier, test) in tiers {
        let mut hits = candidates
            .iter()
            .filter(|c| c.names.iter().any(|name| test(&name.to_lowercase(), &needle)));
        if let Some(first) = hits.next() {
            let others = hits.count();
            if others > 0 {
                warn!(
                    "'{}' matched {} entries by {:?}; using {}",
                    needle,
                    others + 1,
                    tier,
                    first.id
                );
            }
            return Some((first, tier));
        }
    }
    None
}

/// Resolver over one entity kind with an optional cached list
pub struct Resolver<D> {
    directory: D,
    cache: Option<Vec<Candidate>>,
}

impl<D: EntityDirectory> Resolver<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            cache: None,
        }
    }

    /// Start from a list the caller already holds
    pub fn with_cache(directory: D, cached: Vec<Candidate>) -> Self {
        Self {
            directory,
            cache: Some(cached),
        }
    }

    /// The list as of the last fetch
    pub fn cached(&self) -> Option<&[Candidate]> {
        self.cache.as_deref()
    }

    pub fn resolve(&mut self, input: &str) -> Result<String, ResolveError> {
        let kind = self.directory.kind();
        let needle = input.trim();
        if needle.is_empty() {
            return Err(ResolveError::Empty(kind));
        }
        if looks_like_id(needle) {
            return Ok(needle.to_string());
        }

        if let Some(cached) = &self.cache {
            if let Some((hit, _)) = match_candidate(cached, needle) {
                return Ok(hit.id.clone());
            }
            debug!("{} '{}' not in cached list, refetching", kind, needle);
        }

        let fresh = self
            .directory
            .fetch()
            .map_err(|source| ResolveError::Lookup { kind, source })?;
        let found = match_candidate(&fresh, needle).map(|(hit, _)| hit.id.clone());
        self.cache = Some(fresh);

        found.ok_or_else(|| ResolveError::NotFound {
            kind,
            input: input.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DirectoryFn;
    use std::cell::Cell;
    use wm_types::{ApiError, EntityKind};

    fn drivers() -> Vec<Candidate> {
        vec![
            Candidate::new("d-1", vec!["Alex Smith".to_string()]),
            Candidate::new("d-2", vec!["Alexandra Jones".to_string()]),
            Candidate::new("d-3", vec!["Sam".to_string(), "Samuel Green".to_string()]),
        ]
    }

    #[test]
    fn test_looks_like_id() {
        assert!(looks_like_id("3f2b8c9e-1a4d-4c7e-9b0a-123456789abc"));
        assert!(looks_like_id("0123456789abcdef0123"));
        assert!(!looks_like_id("Alex"));
        assert!(!looks_like_id("abc-123"));
    }

    #[test]
    fn test_id_input_skips_fetch() {
        let calls = Cell::new(0);
        let dir = DirectoryFn::new(EntityKind::Driver, || {
            calls.set(calls.get() + 1);
            Ok(drivers())
        });
        let mut resolver = Resolver::new(dir);
        let id = "3f2b8c9e-1a4d-4c7e-9b0a-123456789abc";
        assert_eq!(resolver.resolve(id).unwrap(), id);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_match_tiers() {
        let list = drivers();
        let (hit, tier) = match_candidate(&list, "alex smith").unwrap();
        assert_eq!((hit.id.as_str(), tier), ("d-1", MatchTier::Exact));
        // both Alex entries share the prefix; first wins
        let (hit, tier) = match_candidate(&list, "ALEX").unwrap();
        assert_eq!((hit.id.as_str(), tier), ("d-1", MatchTier::Prefix));
        let (hit, tier) = match_candidate(&list, "green").unwrap();
        assert_eq!((hit.id.as_str(), tier), ("d-3", MatchTier::Contains));
        assert!(match_candidate(&list, "zed").is_none());
    }

    #[test]
    fn test_cache_hit_skips_fetch() {
        let calls = Cell::new(0);
        let dir = DirectoryFn::new(EntityKind::Driver, || {
            calls.set(calls.get() + 1);
            Ok(vec![])
        });
        let mut resolver = Resolver::with_cache(dir, drivers());
        assert_eq!(resolver.resolve("sam").unwrap(), "d-3");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_cache_miss_refetches_once() {
        let calls = Cell::new(0);
        let dir = DirectoryFn::new(EntityKind::Vehicle, || {
            calls.set(calls.get() + 1);
            Ok(vec![Candidate::new("v-7", vec!["TEST-001".to_string()])])
        });
        let mut resolver = Resolver::with_cache(dir, vec![]);
        assert_eq!(resolver.resolve("test-001").unwrap(), "v-7");
        assert_eq!(calls.get(), 1);
        assert_eq!(resolver.cached().map(<[Candidate]>::len), Some(1));
    }

    #[test]
    fn test_not_found_names_input() {
        let calls = Cell::new(0);
        let dir = DirectoryFn::new(EntityKind::Driver, || {
            calls.set(calls.get() + 1);
            Ok(drivers())
        });
        let mut resolver = Resolver::with_cache(dir, drivers());
        let err = resolver.resolve("Nobody Here").unwrap_err();
        assert_eq!(calls.get(), 1);
        match err {
            ResolveError::NotFound { kind, input } => {
                assert_eq!(kind, EntityKind::Driver);
                assert_eq!(input, "Nobody Here");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_failure_is_reported() {
        let dir = DirectoryFn::new(EntityKind::Contractor, || {
            Err(ApiError::new("Forbidden", 403))
        });
        let mut resolver = Resolver::new(dir);
        let err = resolver.resolve("ACME").unwrap_err();
        assert!(matches!(err, ResolveError::Lookup { source, .. } if source.code == 403));
    }

    #[test]
    fn test_empty_input() {
        let dir = DirectoryFn::new(EntityKind::Driver, || Ok(drivers()));
        let mut resolver = Resolver::new(dir);
        assert!(matches!(resolver.resolve("   "), Err(ResolveError::Empty(EntityKind::Driver))));
    }
}
