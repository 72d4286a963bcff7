//! Component G: expert mode policy.
//!
//! A bitmap of allowed file-types plus the `recursive` and `winpe_only`
//! flags (§4.G). The walker (component F) asks this module what to do with
//! each classified entry; the policy never touches the filesystem itself
//! except for the winpe peek, which it delegates to [`crate::winpe`].

use std::path::Path;

use crate::fstype::{Classification, FileKind};
use crate::winpe;

/// What the walker should do with a classified entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hash,
    Recurse,
    Skip,
}

/// Bitmap of allowed file-types, mirroring the `-o <types>` letters
/// (b/c/p/f/l/s/d) from §6.
#[derive(Debug, Clone, Copy)]
pub struct TypePolicy {
    pub regular: bool,
    pub block: bool,
    pub character: bool,
    pub pipe: bool,
    pub socket: bool,
    pub door: bool,
    pub symlink: bool,
}

impl Default for TypePolicy {
    /// Default expert-mode policy: only regular files, matching the
    /// non-expert-mode behavior the CLI falls back to when `-o` is absent.
    fn default() -> Self {
        TypePolicy {
            regular: true,
            block: false,
            character: false,
            pipe: false,
            socket: false,
            door: false,
            symlink: false,
        }
    }
}

impl TypePolicy {
    /// Every type-letter enabled, used by `-o bcpfsld` (the "allow anything"
    /// shorthand some callers reach for).
    pub fn all() -> Self {
        TypePolicy {
            regular: true,
            block: true,
            character: true,
            pipe: true,
            socket: true,
            door: true,
            symlink: true,
        }
    }

    pub fn from_letters(letters: &str) -> Self {
        let mut p = TypePolicy {
            regular: false,
            block: false,
            character: false,
            pipe: false,
            socket: false,
            door: false,
            symlink: false,
        };
        for c in letters.chars() {
            match c {
                'f' => p.regular = true,
                'b' => p.block = true,
                'c' => p.character = true,
                'p' => p.pipe = true,
                's' => p.socket = true,
                'd' => p.door = true,
                'l' => p.symlink = true,
                _ => {}
            }
        }
        p
    }

    fn allows(&self, kind: FileKind) -> bool {
        match kind {
            FileKind::Regular => self.regular,
            FileKind::Block => self.block,
            FileKind::Character => self.character,
            FileKind::Pipe => self.pipe,
            FileKind::Socket => self.socket,
            FileKind::Door => self.door,
            FileKind::Symlink => self.symlink,
            FileKind::Directory | FileKind::Unknown => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExpertPolicy {
    pub types: TypePolicy,
    pub recursive: bool,
    pub winpe_only: bool,
    /// Whether `-o` was given at all (§6). Per `should_hash` in
    /// `original_source/hashdeep/dig.cpp`, the type bitmap only gates
    /// anything when expert mode is active; the plain default walk hashes
    /// every classified kind except directory/unknown and always
    /// dereferences symlinks, rather than requiring `l` in an allowed set.
    pub expert: bool,
}

impl ExpertPolicy {
    pub fn new(types: TypePolicy, recursive: bool, winpe_only: bool, expert: bool) -> Self {
        ExpertPolicy { types, recursive, winpe_only, expert }
    }

    /// Decides what to do with a freshly classified path (§4.G). `dereferenced`
    /// is the re-classification of a symlink target, supplied by the caller
    /// whenever `classified.kind == Symlink`; this breaks the infinite-loop
    /// trap described in §4.G by handing the *target's* kind back through
    /// this same function rather than ever answering "hash it" for a
    /// symlink pointing at a directory.
    pub fn decide(
        &self,
        path: &Path,
        classified: &Classification,
        dereferenced: Option<&Classification>,
    ) -> (Decision, Option<String>) {
        match classified.kind {
            FileKind::Directory => self.decide_directory(),
            FileKind::Symlink => {
                if self.expert && !self.types.symlink {
                    return (Decision::Skip, None);
                }
                let Some(target) = dereferenced else {
                    return (Decision::Skip, Some("dangling symlink".to_string()));
                };
                if target.kind == FileKind::Directory {
                    return self.decide_directory();
                }
                self.decide_non_directory(path, target.kind, path)
            }
            other => self.decide_non_directory(path, other, path),
        }
    }

    fn decide_directory(&self) -> (Decision, Option<String>) {
        if self.recursive {
            (Decision::Recurse, None)
        } else {
            (Decision::Skip, Some("Is a directory".to_string()))
        }
    }

    fn decide_non_directory(
        &self,
        path: &Path,
        kind: FileKind,
        winpe_path: &Path,
    ) -> (Decision, Option<String>) {
        if self.expert {
            if !self.types.allows(kind) {
                return (Decision::Skip, None);
            }
        } else if kind == FileKind::Unknown {
            return (Decision::Skip, Some("unknown file type".to_string()));
        }
        if self.winpe_only {
            return self.decide_winpe(winpe_path);
        }
        let _ = path;
        (Decision::Hash, None)
    }

    fn decide_winpe(&self, path: &Path) -> (Decision, Option<String>) {
        match winpe::looks_like_pe(path) {
            Ok(true) => {
                if winpe::has_recognized_executable_extension(path) {
                    (Decision::Hash, None)
                } else {
                    (
                        Decision::Hash,
                        Some("matches executable signature but lacks a recognized extension".to_string()),
                    )
                }
            }
            Ok(false) => (Decision::Skip, None),
            Err(e) => (Decision::Skip, Some(format!("winpe peek failed: {e}"))),
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
