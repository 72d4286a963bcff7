//! Component A: the algorithm registry.
//!
//! The original C tool dispatches through a table of function pointers
//! (`hashid_t` → init/update/finalize fn ptrs). Per the design notes this
//! becomes a tagged-variant call through an `AlgorithmId` enum: same shape,
//! stronger type discipline (see DESIGN.md).

use std::fmt;

/// The closed, small set of supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlgorithmId {
    Md5,
    Sha1,
    Sha256,
    Tiger,
    Whirlpool,
}

/// All algorithm ids, in the canonical registration order used for
/// column ordering in native HASHDEEP-1.0 output and for `H::search`'s
/// "iterate in id order" rule (§4.H).
pub const ALL_IDS: [AlgorithmId; 5] = [
    AlgorithmId::Md5,
    AlgorithmId::Sha1,
    AlgorithmId::Sha256,
    AlgorithmId::Tiger,
    AlgorithmId::Whirlpool,
];

impl AlgorithmId {
    /// Canonical display name, as used in BSD-tag output and the
    /// HASHDEEP-1.0 banner.
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmId::Md5 => "md5",
            AlgorithmId::Sha1 => "sha1",
            AlgorithmId::Sha256 => "sha256",
            AlgorithmId::Tiger => "tiger",
            AlgorithmId::Whirlpool => "whirlpool",
        }
    }

    /// Output digest length in bits.
    pub fn bit_length(self) -> usize {
        match self {
            AlgorithmId::Md5 => 128,
            AlgorithmId::Sha1 => 160,
            AlgorithmId::Sha256 => 256,
            AlgorithmId::Tiger => 192,
            AlgorithmId::Whirlpool => 512,
        }
    }

    /// Hex digest length, i.e. `bit_length / 4`.
    pub fn hex_len(self) -> usize {
        self.bit_length() / 4
    }

    /// Parse a CLI/column algorithm name. Dashes are ignored and matching is
    /// case-insensitive, matching `enable_by_names`'s contract in §4.A.
    pub fn parse(raw: &str) -> Option<AlgorithmId> {
        let norm: String = raw
            .chars()
            .filter(|c| *c != '-')
            .flat_map(|c| c.to_lowercase())
            .collect();
        match norm.as_str() {
            "md5" => Some(AlgorithmId::Md5),
            "sha1" => Some(AlgorithmId::Sha1),
            "sha256" => Some(AlgorithmId::Sha256),
            "tiger" => Some(AlgorithmId::Tiger),
            "whirlpool" => Some(AlgorithmId::Whirlpool),
            _ => None,
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unknown algorithm name was passed to `enable_by_names` or a column
/// header. Always a fatal user error per §7.
#[derive(Debug, thiserror::Error)]
#[error("unknown hashing algorithm: '{0}'")]
pub struct UnknownAlgorithm(pub String);

/// The process-global table of which algorithms are in use for this run,
/// plus the column order (native-format load order, or CLI `-c` order)
/// used when emitting HASHDEEP-1.0 records.
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry {
    in_use: [bool; 5],
    /// Column order: the order algorithms were enabled in, used for
    /// native-format output and for matching a loaded hash list's column
    /// layout. Defaults to `ALL_IDS` order.
    column_order: Vec<AlgorithmId>,
}

impl Default for AlgorithmRegistry {
    /// Every supported algorithm is registered at startup; by default none
    /// are enabled until a personality or `-c` sets them (§4.A: "the in-use
    /// flag is set by command-line parsing").
    fn default() -> Self {
        AlgorithmRegistry {
            in_use: [false; 5],
            column_order: ALL_IDS.to_vec(),
        }
    }
}

fn idx(id: AlgorithmId) -> usize {
    ALL_IDS.iter().position(|&i| i == id).unwrap()
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_use(&self, id: AlgorithmId) -> bool {
        self.in_use[idx(id)]
    }

    pub fn enable(&mut self, id: AlgorithmId) {
        self.in_use[idx(id)] = true;
    }

    pub fn disable(&mut self, id: AlgorithmId) {
        self.in_use[idx(id)] = false;
    }

    pub fn disable_all(&mut self) {
        self.in_use = [false; 5];
    }

    /// Clears all in-use flags and sets those named in the comma-separated
    /// list. The literal "all" enables every algorithm. An unknown name is
    /// a fatal user error (§4.A).
    pub fn enable_by_names(&mut self, csv: &str) -> Result<(), UnknownAlgorithm> {
        self.disable_all();
        for raw in csv.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if raw.eq_ignore_ascii_case("all") {
                for id in ALL_IDS {
                    self.enable(id);
                }
                continue;
            }
            match AlgorithmId::parse(raw) {
                Some(id) => self.enable(id),
                None => return Err(UnknownAlgorithm(raw.to_string())),
            }
        }
        Ok(())
    }

    /// All ids currently in use, in registration (id) order.
    pub fn in_use_ids(&self) -> Vec<AlgorithmId> {
        ALL_IDS.iter().copied().filter(|&id| self.is_in_use(id)).collect()
    }

    pub fn any_in_use(&self) -> bool {
        self.in_use.iter().any(|&b| b)
    }

    /// Set the column order explicitly, e.g. from a loaded HASHDEEP-1.0
    /// header (§4.I). Also enables every algorithm named.
    pub fn set_column_order(&mut self, order: Vec<AlgorithmId>) {
        self.disable_all();
        for &id in &order {
            self.enable(id);
        }
        self.column_order = order;
    }

    pub fn column_order(&self) -> &[AlgorithmId] {
        &self.column_order
    }

    /// `true` iff `s` is exactly `bit_length/4` hex digits (§4.A).
    pub fn valid_hash(id: AlgorithmId, s: &str) -> bool {
        s.len() == id.hex_len() && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
