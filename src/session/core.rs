//! Ties components A–K together into one runnable engine (§2 "data flow").
//!
//! Per the design notes' "global mutable state consolidated into one
//! context object" (§9), every piece of run-wide state — the registry, the
//! known-hash store, the output coordinator, the worker pool — is built
//! once here and threaded explicitly through closures, rather than living
//! behind a de-facto singleton the way the original C tool's `state *s`
//! did.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::algorithms::{AlgorithmId, AlgorithmRegistry};
use crate::audit::{self, MatchingMode};
use crate::cli::{parse_size_suffix, CommonArgs, Personality};
use crate::fstype::FileKind;
use crate::output::{OutputConfig, OutputCoordinator, OutputFormat, RecordOutput};
use crate::pathnorm;
use crate::pipeline::{self, PipelineConfig};
use crate::policy::{ExpertPolicy, TypePolicy};
use crate::pool::WorkerPool;
use crate::progress::{NullProgress, ProgressReporter, TerminalProgress};
use crate::store::{FileRecord, KnownHashStore};
use crate::walk::{self, WalkEvent};

/// Exit codes per §6/§7: 0 success; 1 unused hashes in the known set (also
/// audit failure); 2 input did not match; 64 user error; 128 internal error.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_UNUSED_OR_AUDIT_FAIL: i32 = 1;
pub const EXIT_NO_MATCH: i32 = 2;
pub const EXIT_USER_ERROR: i32 = 64;
pub const EXIT_INTERNAL_ERROR: i32 = 128;

/// Everything a run needs, resolved once from [`CommonArgs`] (§6 CLI
/// surface) before any file is touched.
pub struct Config {
    pub registry: AlgorithmRegistry,
    pub policy: ExpertPolicy,
    pub piece_len: u64,
    pub triage: bool,
    pub mode: MatchingMode,
    pub known_files: Vec<PathBuf>,
    pub paths: Vec<PathBuf>,
    pub jobs: usize,
    pub output: OutputConfig,
    pub bare: bool,
    pub relative: bool,
    pub verbose_audit: bool,
    pub size_threshold_under: Option<u64>,
    pub silent: bool,
    /// `-W FILE`: write output to `FILE` instead of stdout. Resolving this
    /// into an actual writer is left to the binary entry point, which
    /// knows whether stdout needs the raw-fd treatment.
    pub output_file: Option<PathBuf>,
}

/// Resolves [`CommonArgs`] into a [`Config`], applying the personality's
/// default algorithm set and rejecting contradictory mode combinations as
/// a fatal user error (§7 "unparseable CLI, contradictory modes" -> 64).
pub fn build(personality: Personality, args: CommonArgs, command_line: String) -> Result<Config> {
    let mut registry = AlgorithmRegistry::new();
    match &args.algorithms {
        Some(csv) => registry
            .enable_by_names(csv)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("bad -c algorithm list")?,
        None => {
            for &id in personality.default_algorithms {
                registry.enable(id);
            }
        }
    }
    // `enable`/`enable_by_names` only flip in-use bits; the column order
    // used for the banner and every CSV row still needs to be pinned to
    // exactly the algorithms this run selected, in that order.
    registry.set_column_order(registry.in_use_ids());

    let mode_flags = [
        args.match_mode || args.match_mode_print,
        args.match_neg_mode || args.match_neg_mode_print,
        args.audit,
        args.triage,
    ];
    if mode_flags.iter().filter(|&&b| b).count() > 1 {
        bail!("match, match-neg, audit, and triage modes are mutually exclusive");
    }
    if !personality.full && (args.audit || args.match_mode || args.match_neg_mode || !args.known.is_empty()) {
        bail!(
            "{} does not support hash-list matching or audit modes (use hashdeep)",
            personality.binary_name
        );
    }

    let mode = if args.audit {
        MatchingMode::Audit
    } else if args.match_mode || args.match_mode_print {
        MatchingMode::Match
    } else if args.match_neg_mode || args.match_neg_mode_print {
        MatchingMode::MatchNeg
    } else if args.triage {
        MatchingMode::Triage
    } else {
        MatchingMode::PlainCompute
    };

    let piece_len = match &args.piecewise {
        Some(raw) => parse_size_suffix(raw).map_err(|e| anyhow::anyhow!(e)).context("bad -p size")?,
        None => 0,
    };
    if args.piecewise.as_deref() == Some("0") {
        bail!("piecewise blocks of zero bytes are impossible");
    }

    let expert = args.expert_types.is_some();
    let types = match &args.expert_types {
        Some(letters) => TypePolicy::from_letters(letters),
        None => TypePolicy::default(),
    };
    let policy = ExpertPolicy::new(types, args.recursive, args.winpe_only, expert);

    let size_threshold_under = args.threshold_under;
    let size_threshold_over = args.threshold_over;

    let jobs = args.jobs.unwrap_or_else(crate::pool::detect_cpu_count).max(1);

    let output_format = if args.dfxml {
        OutputFormat::Dfxml
    } else if personality.full {
        OutputFormat::Csv
    } else {
        OutputFormat::Plain
    };

    let output = OutputConfig {
        format: output_format,
        mode,
        show_matched_name: args.show_matched,
        escape_unicode: args.escape_unicode,
        zero_terminator: args.zero_terminator,
        size_threshold: size_threshold_over,
        show_hash_in_match: args.match_mode_print || args.match_neg_mode_print,
        command_line,
    };

    let paths = if args.paths.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.paths
    };

    Ok(Config {
        registry,
        policy,
        piece_len,
        triage: mode == MatchingMode::Triage,
        mode,
        known_files: args.known,
        paths,
        jobs,
        output,
        bare: args.bare,
        relative: args.relative,
        verbose_audit: args.audit && args.verbose > 0,
        size_threshold_under,
        silent: args.silent,
        output_file: args.output_file,
    })
}

/// Loads every `-k` known-hash file into one [`KnownHashStore`] (§4.I
/// driving §4.H). A later file whose HASHDEEP-1.0 column layout differs
/// from the first is accepted with a warning, not rejected (§4.I).
fn load_known_stores(cfg: &Config) -> Result<KnownHashStore> {
    let mut store = KnownHashStore::new();
    let active = cfg.registry.in_use_ids();
    let mut first_hashdeep_columns: Option<Vec<AlgorithmId>> = None;

    for path in &cfg.known_files {
        let bytes = crate::common::io::read_file_bytes(path)
            .with_context(|| format!("failed to read known-hash file {}", path.display()))?;
        let report = crate::hashlist::load(&bytes, &active, &mut store)
            .with_context(|| format!("failed to parse known-hash file {}", path.display()))?;
        if let crate::hashlist::DetectedFormat::Hashdeep1_0(columns) = &report.format {
            match &first_hashdeep_columns {
                None => first_hashdeep_columns = Some(columns.clone()),
                Some(first) if first != columns => {
                    eprintln!(
                        "warning: {} has a different column layout than the first known-hash file loaded",
                        path.display()
                    );
                }
                _ => {}
            }
        }
        for bad in &report.bad_records {
            eprintln!("{}: line {}: {}", path.display(), bad.line, bad.reason);
        }
    }
    Ok(store)
}

/// One tool invocation, end to end: parse argv, build a [`Config`], resolve
/// the output writer, run, and translate the result into a process exit
/// code (§6, §7). Every `[[bin]]` target is a three-line call into this,
/// generalizing the teacher's per-tool `main()` (`bin/fmd5sum.rs`) the same
/// way [`Personality`] generalizes the original `*deep` argv0 dispatch.
pub fn main_for(personality: Personality) -> ! {
    use clap::Parser;
    crate::common::reset_sigpipe();

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let args = CommonArgs::parse();

    let cfg = match build(personality, args, command_line) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}: {:#}", personality.binary_name, e);
            std::process::exit(EXIT_USER_ERROR);
        }
    };

    let output_path = cfg.output_file.clone();
    let code = match output_path {
        Some(path) => match std::fs::File::create(&path) {
            Ok(file) => run(cfg, std::io::BufWriter::new(file)),
            Err(e) => {
                eprintln!(
                    "{}: {}: {}",
                    personality.binary_name,
                    path.display(),
                    crate::common::io_error_msg(&e)
                );
                std::process::exit(EXIT_USER_ERROR);
            }
        },
        None => run_on_stdout(cfg),
    };

    match code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", personality.binary_name, e);
            std::process::exit(EXIT_INTERNAL_ERROR);
        }
    }
}

/// Stdout as an owned, `'static` writer (so it can be handed to
/// [`run`]'s generic `W`). Raw-fd on Unix, mirroring the teacher's
/// `ManuallyDrop<File>` idiom, except the fd is allowed to close on drop
/// here — the process is about to exit either way.
#[cfg(unix)]
fn run_on_stdout(cfg: Config) -> Result<i32> {
    use std::os::unix::io::FromRawFd;
    let raw = unsafe { std::fs::File::from_raw_fd(1) };
    run(cfg, std::io::BufWriter::new(raw))
}

#[cfg(not(unix))]
fn run_on_stdout(cfg: Config) -> Result<i32> {
    run(cfg, std::io::BufWriter::new(std::io::stdout()))
}

/// Formats a path for output per `-b`/`-l` (§4.K, §4.E): bare strips to the
/// file name, relative leaves the path as given, and the default applies
/// the lexical canonicaliser (never dereferencing a symlink) to the
/// absolute form.
fn format_output_path(path: &Path, bare: bool, relative: bool) -> String {
    if bare {
        return path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
    }
    if relative {
        return path.to_string_lossy().into_owned();
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    pathnorm::clean(&absolute.to_string_lossy())
}

/// Runs the full session: loads known hashes, walks every root, hashes
/// every hashable entry (optionally across a worker pool), matches/audits,
/// and returns the process exit code (§6, §7).
pub fn run<W: Write + Send + 'static>(cfg: Config, writer: W) -> Result<i32> {
    let active = cfg.registry.in_use_ids();
    if active.is_empty() {
        bail!("no hashing algorithms are enabled");
    }

    let store = Arc::new(load_known_stores(&cfg)?);
    let output = Arc::new(OutputCoordinator::new(cfg.output.clone(), writer));

    if cfg.output.format == OutputFormat::Csv {
        output.write_banner(cfg.registry.column_order())?;
    }
    if cfg.output.format == OutputFormat::Dfxml {
        output.write_dfxml_header()?;
    }

    let pool = WorkerPool::new(cfg.jobs);
    let file_counter = Arc::new(AtomicU64::new(0));
    let column_order: Vec<AlgorithmId> = cfg.registry.column_order().to_vec();
    let had_no_match = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let had_unwanted_match = Arc::new(std::sync::atomic::AtomicBool::new(false));

    for root in &cfg.paths {
        if root.as_os_str() == "-" {
            hash_stdin(
                &cfg,
                &active,
                &column_order,
                &store,
                &output,
                &file_counter,
                &had_no_match,
                &had_unwanted_match,
            )?;
            continue;
        }

        walk::walk(root, &cfg.policy, &mut |event| match event {
            WalkEvent::Hashable { path, classification } => {
                if classification.kind == FileKind::Directory {
                    return;
                }
                if let Some(min) = cfg.size_threshold_under {
                    if classification.size < min {
                        return;
                    }
                }
                let store = Arc::clone(&store);
                let output = Arc::clone(&output);
                let active = active.clone();
                let column_order = column_order.clone();
                let file_counter = Arc::clone(&file_counter);
                let had_no_match = Arc::clone(&had_no_match);
                let had_unwanted_match = Arc::clone(&had_unwanted_match);
                let piece_len = cfg.piece_len;
                let triage = cfg.triage;
                let mode = cfg.mode;
                let verbose_audit = cfg.verbose_audit;
                let bare = cfg.bare;
                let relative = cfg.relative;
                let silent = cfg.silent;
                let size = classification.size;
                let mtime = classification.mtime;

                pool.schedule(move || {
                    hash_one_file(
                        &path, size, mtime, piece_len, triage, mode, verbose_audit, bare, relative,
                        silent, &active, &column_order, &store, &output, &file_counter,
                        &had_no_match, &had_unwanted_match,
                    );
                });
            }
            WalkEvent::Diagnostic { path, message } => {
                eprintln!("{}: {}", path.display(), message);
            }
        });
    }

    pool.wait_till_all_free();
    pool.shutdown();
    if cfg.output.format == OutputFormat::Dfxml {
        output.write_dfxml_footer()?;
    }
    output.flush()?;

    if cfg.mode == MatchingMode::Audit {
        output.finalize_audit(&store);
        let counters = output.audit_counters();
        if !counters.passes() {
            return Ok(EXIT_UNUSED_OR_AUDIT_FAIL);
        }
        return Ok(EXIT_SUCCESS);
    }

    if cfg.mode == MatchingMode::Match && had_no_match.load(Ordering::Relaxed) {
        return Ok(EXIT_NO_MATCH);
    }
    if cfg.mode == MatchingMode::MatchNeg && had_unwanted_match.load(Ordering::Relaxed) {
        return Ok(EXIT_NO_MATCH);
    }

    Ok(EXIT_SUCCESS)
}

#[allow(clippy::too_many_arguments)]
fn hash_stdin(
    cfg: &Config,
    active: &[AlgorithmId],
    column_order: &[AlgorithmId],
    store: &KnownHashStore,
    output: &OutputCoordinator<impl Write>,
    file_counter: &AtomicU64,
    had_no_match: &std::sync::atomic::AtomicBool,
    had_unwanted_match: &std::sync::atomic::AtomicBool,
) -> Result<()> {
    let mut source = pipeline::StreamSource(std::io::stdin().lock());
    let pipeline_cfg = PipelineConfig {
        ideal_block: pipeline::IDEAL_BLOCK,
        piece_len: cfg.piece_len,
        triage: cfg.triage,
    };
    let mut reporter: Box<dyn ProgressReporter> = if cfg.silent {
        Box::new(NullProgress)
    } else {
        Box::new(TerminalProgress::new())
    };
    reporter.start(None, "stdin");
    let mut on_error = |msg: String| eprintln!("stdin: {msg}");
    let mut on_progress = |done: u64, eta: Option<u64>| reporter.update(done, eta);
    let outcome = pipeline::run(&mut source, &pipeline_cfg, active, None, &mut on_error, Some(&mut on_progress))
        .context("error reading from stdin")?;
    reporter.finish();

    emit_outcome(
        "stdin",
        0,
        None,
        &outcome,
        cfg.mode,
        cfg.verbose_audit,
        column_order,
        store,
        output,
        file_counter,
        had_no_match,
        had_unwanted_match,
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn hash_one_file(
    path: &Path,
    size: u64,
    mtime: Option<std::time::SystemTime>,
    piece_len: u64,
    triage: bool,
    mode: MatchingMode,
    verbose_audit: bool,
    bare: bool,
    relative: bool,
    silent: bool,
    active: &[AlgorithmId],
    column_order: &[AlgorithmId],
    store: &KnownHashStore,
    output: &OutputCoordinator<impl Write>,
    file_counter: &AtomicU64,
    had_no_match: &std::sync::atomic::AtomicBool,
    had_unwanted_match: &std::sync::atomic::AtomicBool,
) {
    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}: {}", path.display(), crate::common::io_error_msg(&e));
            return;
        }
    };

    let pipeline_cfg = PipelineConfig {
        ideal_block: pipeline::IDEAL_BLOCK,
        piece_len,
        triage,
    };
    let mut reporter: Box<dyn ProgressReporter> = if silent {
        Box::new(NullProgress)
    } else {
        Box::new(TerminalProgress::new())
    };
    reporter.start(Some(size), &path.to_string_lossy());
    let mut on_error = |msg: String| eprintln!("{}: {}", path.display(), msg);
    let mut on_progress = |done: u64, eta: Option<u64>| reporter.update(done, eta);
    let outcome = match pipeline::run(&mut file, &pipeline_cfg, active, Some(size), &mut on_error, Some(&mut on_progress)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}: {}", path.display(), crate::common::io_error_msg(&e));
            return;
        }
    };
    reporter.finish();

    let display_name = format_output_path(path, bare, relative);
    emit_outcome(
        &display_name,
        size,
        mtime,
        &outcome,
        mode,
        verbose_audit,
        column_order,
        store,
        output,
        file_counter,
        had_no_match,
        had_unwanted_match,
    );
}

/// Shared tail of `hash_one_file`/`hash_stdin`: turns a [`pipeline::PipelineOutcome`]
/// into one or more [`FileRecord`]s (one per piece, per §4.C piecewise
/// semantics), matches each against the known store, and emits it.
#[allow(clippy::too_many_arguments)]
fn emit_outcome(
    display_name: &str,
    file_size: u64,
    mtime: Option<std::time::SystemTime>,
    outcome: &pipeline::PipelineOutcome,
    mode: MatchingMode,
    verbose_audit: bool,
    column_order: &[AlgorithmId],
    store: &KnownHashStore,
    output: &OutputCoordinator<impl Write>,
    file_counter: &AtomicU64,
    had_no_match: &std::sync::atomic::AtomicBool,
    had_unwanted_match: &std::sync::atomic::AtomicBool,
) {
    for piece in &outcome.pieces {
        let mut record = FileRecord::new(display_name.to_string(), file_size);
        record.read_bytes = piece.bytes_hashed;
        record.mtime = mtime;
        record.file_name_annotation = piece.annotation.clone();
        for (id, hex) in &piece.hashes {
            record.hash_hex.insert(*id, hex.clone());
        }

        let file_number = file_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let verdict = audit::evaluate(store, &record, column_order);

        // `search` only grades the verdict; stamping `matched_file_number`
        // (so a later audit sweep knows this known-store entry was seen)
        // goes through `find`, which needs the same id/hex pair `search`
        // matched on.
        let matched_record = if verdict != crate::store::MatchVerdict::NoMatch {
            column_order.iter().copied().find_map(|id| {
                let hex = record.hex_for(id)?;
                if hex.is_empty() {
                    return None;
                }
                store.find(id, hex, &record.file_name, file_number)
            })
        } else {
            None
        };

        match mode {
            MatchingMode::Match if verdict == crate::store::MatchVerdict::NoMatch => {
                had_no_match.store(true, Ordering::Relaxed);
            }
            MatchingMode::MatchNeg if verdict != crate::store::MatchVerdict::NoMatch => {
                had_unwanted_match.store(true, Ordering::Relaxed);
            }
            _ => {}
        }

        let matched_name = matched_record.map(|r| r.file_name.clone());

        let annotation = record.file_name_annotation.as_deref();
        let record_output = RecordOutput {
            filename: display_name,
            file_size,
            display_size: piece.bytes_hashed,
            annotation,
            mtime: record.mtime,
            hashes: &piece.hashes,
            verdict,
            matched_name: matched_name.as_deref(),
        };
        let _ = output.emit(&record_output, column_order, verbose_audit);
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
