//! Component C: the hashing pipeline.
//!
//! Generalizes the teacher's buffered read loop (`hash/core.rs`'s
//! mmap-or-stream split) into the spec's bounded-chunk, zero-pad-on-error,
//! piecewise-aware streaming driver (§4.C). The mmap fast path is dropped
//! entirely here: the forensic zero-fill-on-read-error contract needs a
//! byte-for-byte accounting of every chunk, which an mmap'd SIGBUS-on-error
//! page cannot give us. See DESIGN.md for that tradeoff.

use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom};
use std::time::Instant;

use crate::algorithms::AlgorithmId;
use crate::hashctx::HashContextBundle;

/// 8 KiB, the teacher's `HASH_READ_BUF` constant, reused verbatim as the
/// spec's "ideal block" default (§4.C).
pub const IDEAL_BLOCK: usize = 8 * 1024;

/// The 512-byte quick fingerprint size for triage mode (§4.C, glossary).
pub const TRIAGE_SIZE: u64 = 512;

pub struct PipelineConfig {
    pub ideal_block: usize,
    /// 0 means whole-file mode.
    pub piece_len: u64,
    pub triage: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            ideal_block: IDEAL_BLOCK,
            piece_len: 0,
            triage: false,
        }
    }
}

/// One finished piece (the whole file, in whole-file mode; one fixed-size
/// segment otherwise).
#[derive(Debug)]
pub struct PieceResult {
    pub hashes: BTreeMap<AlgorithmId, String>,
    pub bytes_hashed: u64,
    /// `" offset START-END"`, set only in piecewise mode (§4.C).
    pub annotation: Option<String>,
}

#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub pieces: Vec<PieceResult>,
    /// Set when triage mode ran; the 512-byte quick-fingerprint digests.
    pub triage: Option<BTreeMap<AlgorithmId, String>>,
    pub total_read: u64,
    pub had_recoverable_error: bool,
}

/// A source the pipeline can read bounded chunks from, optionally seekable.
/// Files implement real seeking; stdin reports `false` from `try_seek` and
/// the pipeline simply continues without realigning (a failed read on a
/// non-seekable source hasn't consumed bytes past the failure point).
pub trait ChunkSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// Seeks forward `n` bytes from the current position (used to realign
    /// after a read error that left the cursor short of a full chunk).
    fn skip_forward(&mut self, n: u64) -> bool;
    fn try_rewind(&mut self) -> bool;
}

impl ChunkSource for std::fs::File {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn skip_forward(&mut self, n: u64) -> bool {
        Seek::seek(self, SeekFrom::Current(n as i64)).is_ok()
    }

    fn try_rewind(&mut self) -> bool {
        Seek::seek(self, SeekFrom::Start(0)).is_ok()
    }
}

/// Wraps any plain `Read` (stdin) as a non-seekable [`ChunkSource`].
pub struct StreamSource<R: Read>(pub R);

impl<R: Read> ChunkSource for StreamSource<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }

    fn skip_forward(&mut self, _n: u64) -> bool {
        false
    }

    fn try_rewind(&mut self) -> bool {
        false
    }
}

/// Errno values that abort the whole file rather than being zero-padded
/// over (§4.C): permission denied, no such device, bad descriptor, file too
/// big, text busy, I/O error, invalid argument.
fn is_fatal_errno(e: &io::Error) -> bool {
    match e.raw_os_error() {
        Some(code) => matches!(
            code,
            libc::EACCES | libc::ENODEV | libc::EBADF | libc::EFBIG | libc::ETXTBSY
                | libc::EIO | libc::EINVAL
        ),
        None => false,
    }
}

/// Sink for per-file recoverable errors; stands in for the output
/// coordinator (component K) until the pipeline is wired into a session.
pub type ErrorSink<'a> = &'a mut dyn FnMut(String);

/// Sink for progress updates: bytes read so far, and an estimated seconds
/// remaining if the total size is known.
pub type ProgressSink<'a> = &'a mut dyn FnMut(u64, Option<u64>);

/// Runs the full pipeline described in §4.C over `source`: optional triage
/// pass, then the main (possibly piecewise) pass.
pub fn run(
    source: &mut dyn ChunkSource,
    cfg: &PipelineConfig,
    active: &[AlgorithmId],
    total_size: Option<u64>,
    on_error: &mut dyn FnMut(String),
    mut on_progress: Option<ProgressSink>,
) -> Result<PipelineOutcome, io::Error> {
    let mut outcome = PipelineOutcome::default();

    if cfg.triage {
        let mut bundle = HashContextBundle::new(active);
        bundle.init();
        let (read, fatal) = read_piece(source, &mut bundle, cfg.ideal_block, TRIAGE_SIZE, on_error)?;
        outcome.had_recoverable_error |= fatal.is_some();
        outcome.triage = Some(bundle.finalize());
        if !source.try_rewind() {
            return Ok(outcome);
        }
        let _ = read;
    }

    let mut start_offset: u64 = 0;
    let mut last_progress = Instant::now();
    loop {
        let mut bundle = HashContextBundle::new(active);
        bundle.init();
        let piece_target = if cfg.piece_len == 0 { u64::MAX } else { cfg.piece_len };
        let (bytes_hashed, recoverable) =
            read_piece(source, &mut bundle, cfg.ideal_block, piece_target, on_error)?;
        outcome.had_recoverable_error |= recoverable.is_some();

        // An exact multiple of the piece size reaches EOF on a zero-byte
        // read right after the last full piece; that trailing empty piece
        // must not be emitted (§8 boundary behaviour). A genuinely empty
        // whole file still gets its one (empty) piece, since this is the
        // very first iteration.
        if bytes_hashed == 0 && !outcome.pieces.is_empty() {
            break;
        }

        outcome.total_read += bytes_hashed;
        let hashes = bundle.finalize();
        let annotation = if cfg.piece_len != 0 {
            let end = if bytes_hashed == 0 {
                0
            } else {
                start_offset + bytes_hashed - 1
            };
            Some(format!(" offset {start_offset}-{end}"))
        } else {
            None
        };
        let hit_eof = bytes_hashed < piece_target;
        outcome.pieces.push(PieceResult {
            hashes,
            bytes_hashed,
            annotation,
        });

        if let Some(cb) = on_progress.as_deref_mut() {
            if last_progress.elapsed().as_secs() >= 1 {
                let remaining = total_size.and_then(|total| {
                    let done = outcome.total_read.min(total);
                    let remaining_bytes = total.saturating_sub(done);
                    if done == 0 {
                        None
                    } else {
                        let elapsed = last_progress.elapsed().as_secs_f64().max(0.001);
                        let rate = done as f64 / elapsed;
                        Some((remaining_bytes as f64 / rate) as u64)
                    }
                });
                cb(outcome.total_read, remaining);
                last_progress = Instant::now();
            }
        }

        start_offset += bytes_hashed;
        if hit_eof {
            break;
        }
        if cfg.piece_len == 0 {
            break;
        }
    }

    Ok(outcome)
}

/// Reads up to `target_len` bytes from `source` in `ideal_block`-sized
/// chunks, feeding every chunk (zero-padded on error) into `bundle`.
/// Returns `(bytes_hashed, Some(message))` when a recoverable per-file
/// error was hit along the way.
fn read_piece(
    source: &mut dyn ChunkSource,
    bundle: &mut HashContextBundle,
    ideal_block: usize,
    target_len: u64,
    on_error: &mut dyn FnMut(String),
) -> Result<(u64, Option<String>), io::Error> {
    let mut total: u64 = 0;
    let mut recoverable = None;
    let mut buf = vec![0u8; ideal_block];

    while total < target_len {
        let want = ideal_block.min((target_len - total) as usize);
        let chunk = &mut buf[..want];
        chunk.fill(0);

        match source.read_chunk(chunk) {
            Ok(0) => break,
            Ok(n) => {
                bundle.update(&chunk[..n]);
                total += n as u64;
                if n < want {
                    break;
                }
            }
            Err(e) => {
                if is_fatal_errno(&e) {
                    return Err(e);
                }
                let msg = crate::common::io_error_msg(&e);
                on_error(msg.clone());
                recoverable = Some(msg);
                bundle.update(chunk);
                total += want as u64;
                source.skip_forward(want as u64);
            }
        }
    }

    Ok((total, recoverable))
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
