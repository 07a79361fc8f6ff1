//! Query Engine
//!
//! A `Query` names a match method, a field, an optional sort field, and a
//! result limit. `compile` parses the keyword once; `CompiledQuery::run` then
//! executes filter, sort, reverse, and limit, in that order, over any record
//! shape implementing `RecordView`.

pub mod engine;
pub mod matcher;

pub use engine::{
    compact, devices, digest_conflicts, filter, is_live, reverse, shuffle, skip, sort_by_field,
    take, total_size,
};
pub use matcher::{field_text, Matcher};

use crate::error::QueryError;
use crate::store::RecordView;
use crate::types::{Field, MatchMethod};
use tracing::debug;

/// Uncompiled query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub method: MatchMethod,
    pub field: Field,
    pub sort: Option<Field>,
    pub keyword: String,
    /// Maximum results; `0` means unlimited.
    pub limit: usize,
    pub descending: bool,
    pub negate: bool,
}

impl Query {
    /// Match `field` against `keyword` with `method`; no sort, no limit.
    pub fn new(method: MatchMethod, field: Field, keyword: impl Into<String>) -> Self {
        Query {
            method,
            field,
            sort: None,
            keyword: keyword.into(),
            limit: 0,
            descending: false,
            negate: false,
        }
    }

    pub fn sorted_by(mut self, field: Field) -> Self {
        self.sort = Some(field);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn compile(&self) -> Result<CompiledQuery, QueryError> {
        let matcher = Matcher::new(self.method, self.field, &self.keyword, self.negate)?;
        Ok(CompiledQuery {
            matcher,
            sort: self.sort,
            limit: self.limit,
            descending: self.descending,
        })
    }
}

/// A query whose keyword has been parsed.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    matcher: Matcher,
    sort: Option<Field>,
    limit: usize,
    descending: bool,
}

impl CompiledQuery {
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn run<R>(&self, records: &[R]) -> Vec<R>
    where
        R: RecordView + Clone + Default + Send + Sync,
    {
        let mut out = filter(records, &self.matcher);
        if let Some(field) = self.sort {
            sort_by_field(&mut out, field);
        }
        if self.descending {
            reverse(&mut out);
        }
        if self.limit > 0 {
            out.truncate(self.limit);
        }
        debug!(
            method = %self.matcher.method(),
            field = %self.matcher.field(),
            input = records.len(),
            matched = out.len(),
            "query finished"
        );
        out
    }
}
