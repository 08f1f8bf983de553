//! Query keys
//!
//! A key is an ordered tuple of segments identifying a logical resource
//! collection or item, e.g. `shipments/list/{status=Delivered}` or
//! `shipments/detail/3`. Two keys are equal iff their serialized forms are
//! equal; filter segments are kept sorted so equality never depends on
//! insertion order. Invalidation matches on key prefixes, which is why keys
//! stay structural instead of being hashed.

use std::fmt;

use crate::provider::models::{FilterSet, PageRequest};

/// One segment of a query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A fixed word: domain, `"list"`, `"detail"`, or an id.
    Word(String),
    /// A parameter set, serialized in sorted field order.
    Filters(FilterSet),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Word(word) => f.write_str(word),
            Segment::Filters(filters) => {
                write!(f, "{{")?;
                for (i, (field, value)) in filters.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&")?;
                    }
                    write!(f, "{}={}", field, value.to_param())?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// An ordered, serializable query key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<Segment>);

impl QueryKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a word segment.
    pub fn word(mut self, word: impl Into<String>) -> Self {
        self.0.push(Segment::Word(word.into()));
        self
    }

    /// Append a filter segment.
    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.0.push(Segment::Filters(filters));
        self
    }

    /// Whether this key starts with the given prefix. Every key is a
    /// prefix of itself.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Key factory, one naming convention for every domain.
///
/// `all(domain)` is a prefix of every key for that domain; `lists(domain)`
/// is a prefix of every list key, which is what mutations invalidate.
pub mod keys {
    use super::*;

    /// `[domain]`
    pub fn all(domain: &str) -> QueryKey {
        QueryKey::new().word(domain)
    }

    /// `[domain, "list"]`
    pub fn lists(domain: &str) -> QueryKey {
        all(domain).word("list")
    }

    /// `[domain, "list", filters+page]`
    pub fn list(domain: &str, filters: &FilterSet, page: &PageRequest) -> QueryKey {
        let mut combined = filters.clone();
        if let Some(p) = page.page {
            combined = combined.with("page", p as i64);
        }
        if let Some(limit) = page.limit {
            combined = combined.with("limit", limit as i64);
        }
        lists(domain).filters(combined)
    }

    /// `[domain, "detail"]`
    pub fn details(domain: &str) -> QueryKey {
        all(domain).word("detail")
    }

    /// `[domain, "detail", id]`
    pub fn detail(domain: &str, id: &str) -> QueryKey {
        details(domain).word(id)
    }
}
