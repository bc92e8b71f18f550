//! Backend-agnostic query filters derived from raw request parameters.
//!
//! A [`QueryFilter`] is built from an untyped, multi-valued key/value list
//! (typically a URL query string). The reserved keys `scope`, `limit` and
//! `offset` are consumed into dedicated fields; every other key becomes an
//! equality constraint in the selector.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Page size used when `limit` is absent or unparsable.
pub const DEFAULT_LIMIT: usize = 10;

/// Skip count used when `offset` is absent or unparsable.
pub const DEFAULT_OFFSET: usize = 0;

const SCOPE_KEY: &str = "scope";
const LIMIT_KEY: &str = "limit";
const OFFSET_KEY: &str = "offset";

/// Structured query: equality selector, field projection, and paging window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Field name to required value.
    pub selector: BTreeMap<String, String>,
    /// Fields to include in results. Empty means every field.
    pub scope: BTreeSet<String>,
    /// Maximum number of records to return.
    pub limit: usize,
    /// Number of matching records to skip.
    pub offset: usize,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            selector: BTreeMap::new(),
            scope: BTreeSet::new(),
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl QueryFilter {
    /// Builds a filter from raw `(key, value)` pairs.
    ///
    /// Keys may repeat; only the first value supplied for a key is used.
    /// Unparsable `limit` / `offset` values are ignored and the defaults kept.
    pub fn extract<I, K, V>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut first_values: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in raw {
            first_values.entry(key.into()).or_insert_with(|| value.into());
        }

        let mut filter = Self::default();
        for (key, value) in first_values {
            match key.as_str() {
                SCOPE_KEY => filter.scope = parse_scope(&value),
                LIMIT_KEY => filter.limit = parse_count(LIMIT_KEY, &value, DEFAULT_LIMIT),
                OFFSET_KEY => filter.offset = parse_count(OFFSET_KEY, &value, DEFAULT_OFFSET),
                _ => {
                    filter.selector.insert(key, value);
                }
            }
        }
        filter
    }

    /// Filter with a single equality constraint and default paging.
    #[must_use]
    pub fn by_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut filter = Self::default();
        filter.selector.insert(field.into(), value.into());
        filter
    }

    /// Returns the filter with its offset replaced.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

fn parse_scope(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_count(key: &str, raw: &str, default: usize) -> usize {
    if raw.is_empty() {
        return default;
    }
    raw.parse().unwrap_or_else(|_| {
        debug!(key, value = raw, "ignoring unparsable query count");
        default
    })
}
