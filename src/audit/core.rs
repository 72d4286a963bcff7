//! Component J: the matcher / auditor.
//!
//! Consults the known-hash store (component H) for a freshly hashed
//! record and grades the outcome (§3, §4.J). The audit-mode counter fold
//! itself lives in `output::core` (see [`evaluate`]'s doc comment), since
//! §5 places those increments behind the output coordinator's mutex.

use crate::store::{FileRecord, KnownHashStore, MatchVerdict};
use crate::algorithms::AlgorithmId;

/// Which of the five matching modes (§1, §4.J) is driving this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingMode {
    PlainCompute,
    Match,
    MatchNeg,
    Audit,
    Triage,
}

/// `{exact, expect, partial, moved, unused, unknown, total}` (§3). `expect`
/// is stamped once at audit start from the known store's size — "how many
/// known entries this run could possibly account for" — the remaining
/// fields accumulate as files are classified.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditCounters {
    pub exact: u64,
    pub expect: u64,
    pub partial: u64,
    pub moved: u64,
    pub unused: u64,
    pub unknown: u64,
    pub total: u64,
}

impl AuditCounters {
    pub fn new(expect: u64) -> Self {
        AuditCounters {
            expect,
            ..Default::default()
        }
    }

    /// §4.J: an audit run passes iff nothing in the known set went unused,
    /// unrecognized, or merely relocated.
    pub fn passes(&self) -> bool {
        self.unused == 0 && self.unknown == 0 && self.moved == 0
    }

    /// §8's audit invariant: every classified-hashable file lands in
    /// exactly one of these four buckets.
    pub fn accounts_for_all_hashable(&self, hashable_count: u64) -> bool {
        self.exact + self.partial + self.unknown + self.moved == hashable_count
    }
}

/// Grades `candidate` against `store` (§4.J). The audit-mode counter fold
/// (`verbose_audit` gating whether a name-only mismatch lands in `exact` or
/// `moved`, per `original_source/hashdeep/audit.cpp`) happens exactly once,
/// in `OutputCoordinator::emit` (output/core.rs), since §5 requires those
/// increments to happen only behind the output coordinator's lock; this
/// function only grades the verdict.
pub fn evaluate(store: &KnownHashStore, candidate: &FileRecord, active: &[AlgorithmId]) -> MatchVerdict {
    store.search(candidate, active)
}

/// Whether a record should be emitted by the output coordinator under
/// `mode`, given its graded verdict (§4.J "match mode" / "match-neg mode").
pub fn should_emit(mode: MatchingMode, verdict: MatchVerdict) -> bool {
    match mode {
        MatchingMode::PlainCompute | MatchingMode::Triage => true,
        MatchingMode::Match => matches!(verdict, MatchVerdict::Match | MatchVerdict::FileNameMismatch),
        MatchingMode::MatchNeg => matches!(verdict, MatchVerdict::NoMatch),
        MatchingMode::Audit => false,
    }
}

/// Final `count_unused` sweep (§4.H, §4.J): tallies every known-store
/// record never matched during the run.
pub fn finish_audit(store: &KnownHashStore, counters: &mut AuditCounters) {
    counters.unused = store.count_unused(|_| {});
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
