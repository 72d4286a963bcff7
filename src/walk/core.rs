//! Component F: the cycle-aware walker.
//!
//! Generalizes the teacher's `du_recursive` manual-recursion style
//! (`du/core.rs`) from hard-link `(dev, ino)` dedup to the spec's
//! canonicalised-path `dir_set` (§3, §4.F): the walker needs to detect a
//! symlink cycle *before* descending, which an inode set alone cannot do
//! for the directory currently being entered.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::common::invariant_violation;
use crate::fstype::{self, Classification, FileKind};
use crate::policy::{Decision, ExpertPolicy};

/// The set of canonicalised directories currently on the recursion stack
/// (§3 "Directory set"). Checked, not silently-idempotent: re-entering a
/// path already on the stack is a programming error, distinct from the
/// cycle check the walker performs *before* calling `enter`.
#[derive(Debug, Default)]
pub struct DirSet {
    stack: HashSet<PathBuf>,
}

impl DirSet {
    pub fn new() -> Self {
        DirSet::default()
    }

    pub fn processing_dir(&mut self, path: PathBuf) {
        if !self.stack.insert(path.clone()) {
            invariant_violation(&format!(
                "directory already on recursion stack: {}",
                path.display()
            ));
        }
    }

    pub fn done_processing_dir(&mut self, path: &Path) {
        self.stack.remove(path);
    }

    pub fn have_processed_dir(&self, path: &Path) -> bool {
        self.stack.contains(path)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// What the walker found at one entry, handed to the caller to dispatch
/// onward (§2: "dispatches hashable files to C").
pub enum WalkEvent {
    Hashable {
        path: PathBuf,
        classification: Classification,
    },
    Diagnostic { path: PathBuf, message: String },
}

/// Recurses `root`, applying `policy` to each entry, pushing one
/// [`WalkEvent`] per outcome into `sink`. Cycle-safe: a directory whose
/// realpath is already in `dirs` is reported as a diagnostic and never
/// entered (§4.F).
pub fn walk(root: &Path, policy: &ExpertPolicy, sink: &mut dyn FnMut(WalkEvent)) {
    let mut dirs = DirSet::new();
    walk_one(root, policy, &mut dirs, sink);
    debug_assert!(dirs.is_empty(), "walker left entries on the directory stack");
}

fn walk_one(path: &Path, policy: &ExpertPolicy, dirs: &mut DirSet, sink: &mut dyn FnMut(WalkEvent)) {
    let classification = match fstype::classify(path) {
        Ok(c) => c,
        Err(e) => {
            sink(WalkEvent::Diagnostic {
                path: path.to_path_buf(),
                message: crate::common::io_error_msg(&e),
            });
            return;
        }
    };

    let dereferenced = if classification.kind == FileKind::Symlink {
        std::fs::metadata(path).ok().map(|m| Classification {
            kind: if m.is_dir() {
                FileKind::Directory
            } else if m.is_file() {
                FileKind::Regular
            } else {
                FileKind::Unknown
            },
            size: m.len(),
            ctime: None,
            mtime: m.modified().ok(),
            atime: m.accessed().ok(),
        })
    } else {
        None
    };

    let (decision, message) = policy.decide(path, &classification, dereferenced.as_ref());
    if let Some(message) = message {
        sink(WalkEvent::Diagnostic {
            path: path.to_path_buf(),
            message,
        });
    }

    match decision {
        Decision::Hash => sink(WalkEvent::Hashable { path: path.to_path_buf(), classification }),
        Decision::Skip => {}
        Decision::Recurse => enter_directory(path, policy, dirs, sink),
    }
}

fn enter_directory(path: &Path, policy: &ExpertPolicy, dirs: &mut DirSet, sink: &mut dyn FnMut(WalkEvent)) {
    let real = match std::fs::canonicalize(path) {
        Ok(r) => r,
        Err(e) => {
            sink(WalkEvent::Diagnostic {
                path: path.to_path_buf(),
                message: crate::common::io_error_msg(&e),
            });
            return;
        }
    };

    if dirs.have_processed_dir(&real) {
        sink(WalkEvent::Diagnostic {
            path: path.to_path_buf(),
            message: "symlink creates cycle".to_string(),
        });
        return;
    }
    dirs.processing_dir(real.clone());

    let entries = match std::fs::read_dir(path) {
        Ok(rd) => rd,
        Err(e) => {
            sink(WalkEvent::Diagnostic {
                path: path.to_path_buf(),
                message: crate::common::io_error_msg(&e),
            });
            dirs.done_processing_dir(&real);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                sink(WalkEvent::Diagnostic {
                    path: path.to_path_buf(),
                    message: crate::common::io_error_msg(&e),
                });
                continue;
            }
        };
        walk_one(&entry.path(), policy, dirs, sink);
    }

    dirs.done_processing_dir(&real);
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
