//! Read policies applied between raw lookups and projection

use std::fmt::Debug;
use std::sync::Arc;

use super::collection::{AttributeSet, ObjectKey};
use crate::domain::DomainError;

/// Raw result of looking up the target keys in a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    /// Keys found in the collection, in request order, with their full attributes
    pub hits: Vec<(ObjectKey, AttributeSet)>,
    /// Keys that were requested but are not cached
    pub misses: Vec<ObjectKey>,
}

impl Candidate {
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }
}

/// Context handed to a policy alongside the candidate
#[derive(Debug, Clone, Copy)]
pub struct PolicyArgs<'a> {
    pub category: &'a str,
    pub resource: &'a str,
    /// Number of keys the read targeted
    pub requested: usize,
}

/// Strategy deciding whether a raw lookup may be served from cache
pub trait Policy: Send + Sync + Debug {
    /// Policy name as used in configuration
    fn name(&self) -> &'static str;

    /// Returns the candidate to serve, or `None` to report a miss
    fn apply(&self, candidate: Candidate, args: &PolicyArgs<'_>) -> Option<Candidate>;
}

/// Serves a read only when every requested key is cached
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOrNonePolicy;

impl Policy for AllOrNonePolicy {
    fn name(&self) -> &'static str {
        "all_or_none"
    }

    fn apply(&self, candidate: Candidate, args: &PolicyArgs<'_>) -> Option<Candidate> {
        if candidate.is_complete() {
            Some(candidate)
        } else {
            tracing::debug!(
                category = args.category,
                resource = args.resource,
                requested = args.requested,
                missing = candidate.misses.len(),
                "Incomplete hit rejected"
            );
            None
        }
    }
}

/// Serves whatever subset is cached, as long as something is
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialHitPolicy;

impl Policy for PartialHitPolicy {
    fn name(&self) -> &'static str {
        "partial_hit"
    }

    fn apply(&self, candidate: Candidate, _args: &PolicyArgs<'_>) -> Option<Candidate> {
        if candidate.hits.is_empty() {
            None
        } else {
            Some(Candidate {
                hits: candidate.hits,
                misses: Vec::new(),
            })
        }
    }
}

/// Configurable policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    AllOrNone,
    PartialHit,
}

impl PolicyKind {
    pub fn build(self) -> Arc<dyn Policy> {
        match self {
            PolicyKind::AllOrNone => Arc::new(AllOrNonePolicy),
            PolicyKind::PartialHit => Arc::new(PartialHitPolicy),
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::AllOrNone => write!(f, "all_or_none"),
            PolicyKind::PartialHit => write!(f, "partial_hit"),
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "all_or_none" | "allornone" => Ok(PolicyKind::AllOrNone),
            "partial_hit" | "partial" => Ok(PolicyKind::PartialHit),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache policy: {}. Valid policies: all_or_none, partial_hit",
                s
            ))),
        }
    }
}
