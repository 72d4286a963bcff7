//! Component H: the known-hash store.
//!
//! An append-only vector of [`FileRecord`]s plus, per algorithm, a
//! hex-string -> record-index multimap, generalizing the teacher's
//! `HashSet<(dev, ino)>` dedup idiom (`du/core.rs`) from a single dedup key
//! to one `HashMap<String, Vec<usize>>` per in-use algorithm.
//!
//! Records are addressed by stable vector index rather than pointer/address
//! (§9's "pointer-linked lists become vectors, record identity is an
//! index").

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::algorithms::AlgorithmId;
use crate::common::invariant_violation;

/// `{file_name, file_size, ..., hash_hex[id]->string, ...}` (§3 "File record").
///
/// `matched_file_number` is the one field mutated after insertion into the
/// known store; it is an atomic so that concurrent match hits from worker
/// threads cannot corrupt the store (§5: "a race cannot corrupt the store,
/// only choose the winner non-deterministically").
#[derive(Debug)]
pub struct FileRecord {
    pub file_name: String,
    pub file_size: u64,
    pub stat_bytes: u64,
    pub read_bytes: u64,
    pub ctime: Option<std::time::SystemTime>,
    pub mtime: Option<std::time::SystemTime>,
    pub atime: Option<std::time::SystemTime>,
    pub hash_hex: HashMap<AlgorithmId, String>,
    pub file_name_annotation: Option<String>,
    pub matched_file_number: AtomicU64,
    pub refcount: AtomicU64,
}

impl FileRecord {
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        FileRecord {
            file_name: file_name.into(),
            file_size,
            stat_bytes: file_size,
            read_bytes: 0,
            ctime: None,
            mtime: None,
            atime: None,
            hash_hex: HashMap::new(),
            file_name_annotation: None,
            matched_file_number: AtomicU64::new(0),
            refcount: AtomicU64::new(1),
        }
    }

    pub fn hex_for(&self, id: AlgorithmId) -> Option<&str> {
        self.hash_hex.get(&id).map(String::as_str)
    }

    pub fn is_unused(&self) -> bool {
        self.matched_file_number.load(Ordering::Relaxed) == 0
    }

    pub fn mark_matched(&self, file_number: u64) {
        self.matched_file_number.store(file_number, Ordering::Relaxed);
    }
}

/// Graded outcome of [`KnownHashStore::search`] (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    Match,
    FileNameMismatch,
    FileSizeMismatch,
    PartialMatch,
    NoMatch,
}

/// Append-only `Vec<FileRecord>` plus a per-algorithm hex->indices multimap
/// (§3 "Known-hash store"). Populated entirely before workers start, then
/// read-only except for `FileRecord::matched_file_number` (§5).
#[derive(Debug, Default)]
pub struct KnownHashStore {
    records: Vec<FileRecord>,
    by_hash: HashMap<AlgorithmId, HashMap<String, Vec<usize>>>,
}

impl KnownHashStore {
    pub fn new() -> Self {
        KnownHashStore {
            records: Vec::new(),
            by_hash: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Appends `record`; indexes it under every algorithm for which its hex
    /// is non-empty. Never removes or mutates prior entries (§3 invariant).
    pub fn add(&mut self, record: FileRecord) -> usize {
        let idx = self.records.len();
        for (&id, hex) in &record.hash_hex {
            if hex.is_empty() {
                continue;
            }
            self.by_hash
                .entry(id)
                .or_default()
                .entry(hex.clone())
                .or_default()
                .push(idx);
        }
        self.records.push(record);
        idx
    }

    /// Returns the first record whose hex matches `hex` under `id` and whose
    /// file name matches `file_name`; failing that, the first record whose
    /// hex matches at all. On a hit, stamps `matched_file_number`.
    pub fn find(
        &self,
        id: AlgorithmId,
        hex: &str,
        file_name: &str,
        file_number: u64,
    ) -> Option<&FileRecord> {
        let candidates = self.by_hash.get(&id)?.get(hex)?;
        if candidates.is_empty() {
            return None;
        }
        let by_name = candidates
            .iter()
            .map(|&i| &self.records[i])
            .find(|r| r.file_name == file_name);
        let hit = by_name.or_else(|| candidates.first().map(|&i| &self.records[i]));
        if let Some(r) = hit {
            r.mark_matched(file_number);
        }
        hit
    }

    /// Consults every in-use algorithm in id order looking for a hash hit,
    /// cross-checks the other in-use algorithms for disagreement, and
    /// grades the outcome (§4.H).
    pub fn search(&self, candidate: &FileRecord, in_use: &[AlgorithmId]) -> MatchVerdict {
        for &id in in_use {
            let Some(hex) = candidate.hex_for(id) else {
                continue;
            };
            if hex.is_empty() {
                continue;
            }
            let Some(indices) = self.by_hash.get(&id).and_then(|m| m.get(hex)) else {
                continue;
            };
            let Some(&idx) = indices.first() else {
                continue;
            };
            let known = &self.records[idx];

            for &other in in_use {
                if other == id {
                    continue;
                }
                if let (Some(ch), Some(kh)) = (candidate.hex_for(other), known.hex_for(other)) {
                    if !ch.is_empty() && !kh.is_empty() && ch != kh {
                        return MatchVerdict::PartialMatch;
                    }
                }
            }
            if known.file_size != candidate.file_size {
                return MatchVerdict::FileSizeMismatch;
            }
            if known.file_name != candidate.file_name {
                return MatchVerdict::FileNameMismatch;
            }
            return MatchVerdict::Match;
        }
        MatchVerdict::NoMatch
    }

    /// Counts every record never matched during this run (§4.H, §8's audit
    /// invariant). `sink` is invoked once per unused record, e.g. to stream
    /// names through the output coordinator.
    pub fn count_unused(&self, mut sink: impl FnMut(&FileRecord)) -> u64 {
        let mut n = 0u64;
        for r in &self.records {
            if r.is_unused() {
                sink(r);
                n += 1;
            }
        }
        n
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
